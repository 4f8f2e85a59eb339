#![no_main]
use std::cell::RefCell;

use arbitrary::{Arbitrary, Unstructured};
use hessian2json::{ObjectInput, Transcoder, TranscoderOptions};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

/// Two option bytes precede the payload.
const HEADER: usize = 2;

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// A small value tree written as well-formed Hessian, so the fuzzer starts
/// from inputs that reach deep into the grammar.
#[derive(Debug, Arbitrary)]
enum Wire {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Date(i64),
    Text(String),
    List(Vec<Wire>),
    Map(Vec<(String, Wire)>),
    Decimal(u32, u8),
    Ref(u8),
}

impl Wire {
    fn write(&self, out: &mut Vec<u8>) {
        match self {
            Self::Null => out.push(b'N'),
            Self::Bool(b) => out.push(if *b { b'T' } else { b'F' }),
            Self::Int(n) => {
                out.push(b'I');
                out.extend(n.to_be_bytes());
            }
            Self::Long(n) => {
                out.push(b'L');
                out.extend(n.to_be_bytes());
            }
            Self::Double(n) => {
                out.push(b'D');
                out.extend(n.to_be_bytes());
            }
            Self::Date(n) => {
                out.push(0x4a);
                out.extend(n.to_be_bytes());
            }
            Self::Text(s) => write_string(out, s),
            Self::List(items) => {
                out.push(0x57);
                items.iter().for_each(|item| item.write(out));
                out.push(b'Z');
            }
            Self::Map(entries) => {
                out.push(b'H');
                for (key, value) in entries {
                    write_string(out, key);
                    value.write(out);
                }
                out.push(b'Z');
            }
            Self::Decimal(unscaled, scale) => {
                out.push(b'C');
                write_string(out, "java.math.BigDecimal");
                out.push(0x91);
                write_string(out, "value");
                out.push(0x60);
                write_string(out, &format!("{unscaled}E-{scale}"));
            }
            Self::Ref(index) => {
                out.push(0x51);
                out.push(0x80 + index % 0x40);
            }
        }
    }
}

/// Final-chunk strings only; lengths count UTF-16 units.
fn write_string(out: &mut Vec<u8>, s: &str) {
    let units: Vec<u16> = s.encode_utf16().take(0xffff).collect();
    out.push(b'S');
    out.extend(u16::try_from(units.len()).unwrap_or(u16::MAX).to_be_bytes());
    for unit in units {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed % 10 == 0 {
        let noise: Vec<u8> = with_rng(|rng| (0..256).map(|_| rng.random::<u8>()).collect());
        let Ok(wire) = Wire::arbitrary(&mut Unstructured::new(&noise)) else {
            return fuzzer_mutate(data, size, max_size);
        };
        let mut encoded = with_rng(|rng| vec![rng.random::<u8>(), rng.random::<u8>()]);
        wire.write(&mut encoded);
        let len = encoded.len().min(max_size);
        data[..len].copy_from_slice(&encoded[..len]);
        len
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

fuzz_target!(|data: &[u8]| {
    let [capacity, depth, payload @ ..] = data else {
        return;
    };
    let options = TranscoderOptions {
        buffer_capacity: usize::from(*capacity),
        max_depth: usize::from(*depth),
        max_reference_expansion: 1 << 16,
    };

    if let Ok(json) = Transcoder::with_options(payload, options).transcode_value() {
        if let Err(err) = serde_json::from_str::<Value>(&json) {
            assert!(
                err.to_string().contains("recursion limit"),
                "invalid JSON {json:?}: {err}"
            );
        }
    }

    let _ = ObjectInput::with_options(payload, options).read_response();
});

use canonical_huffman::{BitVec, BitWrite, CoderConfig, HuffCoder};
use rand::Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TEST_SIZE: usize = 1024;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let mut rng = rand::thread_rng();
    let num_symbols = rng.gen_range(2..=255usize);

    let mut coder = HuffCoder::with_config(CoderConfig::new(num_symbols))?;
    for symbol in 0..num_symbols as u64 {
        coder.insert(symbol, rng.gen_range(0..0x10000))?;
    }
    info!(
        symbols = num_symbols,
        max_code_len = coder.max_code_len()?,
        window = coder.table_bits()?,
        "coder ready"
    );

    let message: Vec<u64> = (0..TEST_SIZE)
        .map(|_| rng.gen_range(0..num_symbols as u64))
        .collect();

    let mut stream = BitVec::new();
    for &symbol in &message {
        coder.encode(symbol, &mut stream)?;
    }
    let payload_bits = stream.bit_len();
    coder.finish(&mut stream)?;
    info!(payload_bits, total_bytes = stream.as_bytes().len(), "encoded");

    let mut reader = stream.reader();
    let mut mismatches = 0;
    for (i, &expected) in message.iter().enumerate() {
        let symbol = coder.decode(&mut reader)?;
        if symbol != expected {
            println!("{}: decoded {} expected {}", i, symbol, expected);
            mismatches += 1;
        }
    }

    if mismatches > 0 {
        return Err(format!("{} symbols failed to round-trip", mismatches).into());
    }
    println!(
        "Round-tripped {} symbols in {} bits ({:.2} bits/symbol)",
        TEST_SIZE,
        payload_bits,
        payload_bits as f64 / TEST_SIZE as f64
    );
    Ok(())
}

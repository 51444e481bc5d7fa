use std::io::{self, Read};

use super::{FREQ_BITS, LOWER_BOUND, Order};
use crate::io::reader::num::{read_itf8, read_u8, read_u32_le};

pub fn decode<R>(reader: &mut R) -> io::Result<Vec<u8>>
where
    R: Read,
{
    let (order, _compressed_len, data_len) = read_header(reader)?;

    let mut dst = vec![0; data_len];

    match order {
        Order::Zero => decode_order_0(reader, &mut dst)?,
        Order::One => decode_order_1(reader, &mut dst)?,
    }

    Ok(dst)
}

fn read_header<R>(reader: &mut R) -> io::Result<(Order, usize, usize)>
where
    R: Read,
{
    let order = read_u8(reader).and_then(|n| {
        Order::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })?;

    let compressed_len = read_u32_le(reader).and_then(|n| {
        usize::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })?;

    let data_len = read_u32_le(reader).and_then(|n| {
        usize::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })?;

    Ok((order, compressed_len, data_len))
}

struct Table {
    frequencies: [u32; 256],
    cumulative_frequencies: [u32; 257],
    // m -> symbol, for all m in [0, 1 << FREQ_BITS)
    lookup: Vec<u8>,
}

impl Table {
    fn new(frequencies: [u32; 256]) -> Self {
        let mut cumulative_frequencies = [0; 257];

        for i in 0..256 {
            cumulative_frequencies[i + 1] = cumulative_frequencies[i] + frequencies[i];
        }

        let mut lookup = vec![0; 1 << FREQ_BITS];

        for sym in 0..256 {
            let start = cumulative_frequencies[sym] as usize;
            let end = cumulative_frequencies[sym + 1] as usize;

            for slot in lookup.iter_mut().take(end.min(1 << FREQ_BITS)).skip(start) {
                *slot = sym as u8;
            }
        }

        Self {
            frequencies,
            cumulative_frequencies,
            lookup,
        }
    }

    fn advance(&self, state: u32, sym: u8) -> u32 {
        let f = self.frequencies[usize::from(sym)];
        let c = self.cumulative_frequencies[usize::from(sym)];
        let m = state & ((1 << FREQ_BITS) - 1);
        f.wrapping_mul(state >> FREQ_BITS).wrapping_add(m).wrapping_sub(c)
    }
}

/// Reads an order-0 frequency table.
///
/// Symbols are ascending with run-length encoding: a symbol byte, an optional
/// run length when the symbol continues a run, and the frequency as ITF8. A
/// zero symbol byte terminates the list.
fn read_frequency_table<R>(reader: &mut R) -> io::Result<Table>
where
    R: Read,
{
    let mut frequencies = [0; 256];

    let mut sym = read_u8(reader)?;
    let mut last_sym = sym;
    let mut rle = 0;

    loop {
        let f = read_itf8(reader).and_then(|n| {
            u32::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        frequencies[usize::from(sym)] = f;

        if rle > 0 {
            rle -= 1;
            sym = sym.wrapping_add(1);
        } else {
            sym = read_u8(reader)?;

            if last_sym < u8::MAX && sym == last_sym + 1 {
                rle = read_u8(reader)?;
            }
        }

        last_sym = sym;

        if sym == 0 {
            break;
        }
    }

    Ok(Table::new(frequencies))
}

fn read_states<R>(reader: &mut R) -> io::Result<[u32; 4]>
where
    R: Read,
{
    let mut states = [0; 4];

    for state in &mut states {
        *state = read_u32_le(reader)?;
    }

    Ok(states)
}

fn renorm<R>(reader: &mut R, mut state: u32) -> io::Result<u32>
where
    R: Read,
{
    while state < LOWER_BOUND {
        state = (state << 8) | u32::from(read_u8(reader)?);
    }

    Ok(state)
}

fn decode_order_0<R>(reader: &mut R, dst: &mut [u8]) -> io::Result<()>
where
    R: Read,
{
    let table = read_frequency_table(reader)?;
    let mut states = read_states(reader)?;

    for (i, b) in dst.iter_mut().enumerate() {
        let j = i % 4;

        let m = states[j] & ((1 << FREQ_BITS) - 1);
        let sym = table.lookup[m as usize];

        *b = sym;

        states[j] = table.advance(states[j], sym);
        states[j] = renorm(reader, states[j])?;
    }

    Ok(())
}

/// Reads the order-1 frequency tables: an outer run-length-encoded list of
/// contexts, each followed by an inner order-0 table for that context.
fn read_frequency_tables<R>(reader: &mut R) -> io::Result<Vec<Option<Box<Table>>>>
where
    R: Read,
{
    let mut tables: Vec<Option<Box<Table>>> = std::iter::repeat_with(|| None).take(256).collect();

    let mut ctx = read_u8(reader)?;
    let mut last_ctx = ctx;
    let mut rle = 0;

    loop {
        let table = read_frequency_table(reader)?;
        tables[usize::from(ctx)] = Some(Box::new(table));

        if rle > 0 {
            rle -= 1;
            ctx = ctx.wrapping_add(1);
        } else {
            ctx = read_u8(reader)?;

            if last_ctx < u8::MAX && ctx == last_ctx + 1 {
                rle = read_u8(reader)?;
            }
        }

        last_ctx = ctx;

        if ctx == 0 {
            break;
        }
    }

    Ok(tables)
}

fn decode_order_1<R>(reader: &mut R, dst: &mut [u8]) -> io::Result<()>
where
    R: Read,
{
    fn table<'a>(tables: &'a [Option<Box<Table>>], ctx: u8) -> io::Result<&'a Table> {
        tables[usize::from(ctx)].as_deref().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("missing rANS frequency table for context {ctx}"),
            )
        })
    }

    let tables = read_frequency_tables(reader)?;
    let mut states = read_states(reader)?;

    let quarter = dst.len() / 4;
    let mut contexts = [0u8; 4];

    for i in 0..quarter {
        for j in 0..4 {
            let t = table(&tables, contexts[j])?;

            let m = states[j] & ((1 << FREQ_BITS) - 1);
            let sym = t.lookup[m as usize];

            dst[j * quarter + i] = sym;

            states[j] = t.advance(states[j], sym);
            states[j] = renorm(reader, states[j])?;

            contexts[j] = sym;
        }
    }

    // The last state carries the remainder when the length is not a multiple
    // of four.
    for i in 4 * quarter..dst.len() {
        let t = table(&tables, contexts[3])?;

        let m = states[3] & ((1 << FREQ_BITS) - 1);
        let sym = t.lookup[m as usize];

        dst[i] = sym;

        states[3] = t.advance(states[3], sym);
        states[3] = renorm(reader, states[3])?;

        contexts[3] = sym;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_header() -> io::Result<()> {
        let data = [
            0x00, // order = 0
            0x25, 0x00, 0x00, 0x00, // compressed size = 37
            0x07, 0x00, 0x00, 0x00, // data size = 7
        ];

        let mut reader = &data[..];
        assert_eq!(read_header(&mut reader)?, (Order::Zero, 37, 7));

        Ok(())
    }

    #[test]
    fn test_decode_order_0() -> io::Result<()> {
        let expected = b"noodles";

        let data = vec![
            0x00, 0x25, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x64, 0x82, 0x49, 0x65, 0x00,
            0x82, 0x49, 0x6c, 0x82, 0x49, 0x6e, 0x82, 0x49, 0x6f, 0x00, 0x84, 0x92, 0x73, 0x82,
            0x49, 0x00, 0xe2, 0x06, 0x83, 0x18, 0x74, 0x7b, 0x41, 0x0c, 0x2b, 0xa9, 0x41, 0x0c,
            0x25, 0x31, 0x80, 0x03,
        ];

        let mut reader = &data[..];
        let actual = decode(&mut reader)?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn test_decode_order_1() -> io::Result<()> {
        let expected = b"noodles";

        let data = vec![
            0x01, 0x3b, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x00, 0x64, 0x84, 0x00, 0x6e,
            0x84, 0x00, 0x6f, 0x00, 0x87, 0xff, 0x00, 0x64, 0x6c, 0x8f, 0xff, 0x00, 0x65, 0x00,
            0x73, 0x8f, 0xff, 0x00, 0x6c, 0x65, 0x8f, 0xff, 0x00, 0x6e, 0x6f, 0x8f, 0xff, 0x00,
            0x6f, 0x00, 0x64, 0x87, 0xff, 0x6f, 0x88, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x02,
            0x02, 0x28, 0x00, 0x01, 0x02, 0x28, 0x00, 0x01, 0x02, 0x60, 0x00, 0x02,
        ];

        let mut reader = &data[..];
        let actual = decode(&mut reader)?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn test_decode_with_invalid_order() {
        let data = [
            0x02, // order = 2 (invalid)
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let mut reader = &data[..];

        assert!(matches!(
            decode(&mut reader),
            Err(e) if e.kind() == io::ErrorKind::InvalidData,
        ));
    }
}

//! Block splitting, per-block EC computation and column-wise interleaving.

use crate::capacity::CapacityEntry;
use crate::reed_solomon::ReedSolomonEncoder;

/// One interleaving unit: its data codewords and their EC codewords.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Block {
    pub data: Vec<u8>,
    pub ec: Vec<u8>,
}

/// Splits `data` into the entry's blocks and computes each block's EC codewords.
///
/// # Panics
///
/// Panics if `data.len()` differs from the entry's data capacity.
pub fn split_blocks(entry: &CapacityEntry, data: &[u8]) -> Vec<Block> {
    assert_eq!(data.len(), entry.data_codewords(), "Data length does not match capacity");
    let rs = ReedSolomonEncoder::new(entry.ec_per_block);
    let mut blocks = Vec::with_capacity(entry.num_blocks());
    let mut dat: &[u8] = data;
    for group in entry.groups() {
        for _ in 0..group.block_count {
            let (block, rest) = dat.split_at(group.data_codewords);
            blocks.push(Block {
                data: block.to_vec(),
                ec: rs.encode(block),
            });
            dat = rest;
        }
    }
    debug_assert!(dat.is_empty());
    blocks
}

/// Produces the transmitted codeword stream: data codewords column by column
/// across all blocks, then EC codewords column by column.
pub fn interleave(entry: &CapacityEntry, data: &[u8]) -> Vec<u8> {
    let blocks = split_blocks(entry, data);
    tracing::trace!(
        blocks = blocks.len(),
        ec_per_block = entry.ec_per_block,
        "interleaving codeword blocks"
    );
    let mut result = Vec::with_capacity(entry.total_codewords());
    let longest = blocks.iter().map(|b| b.data.len()).max().unwrap_or(0);
    for i in 0..longest {
        result.extend(blocks.iter().filter_map(|b| b.data.get(i)));
    }
    for i in 0..entry.ec_per_block {
        result.extend(blocks.iter().map(|b| b.ec[i]));
    }
    debug_assert_eq!(result.len(), entry.total_codewords());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::{ECLevel, Version};

    #[test]
    fn test_single_block_is_data_then_ec() {
        let entry = CapacityEntry::get(Version::new(1), ECLevel::M);
        let data = [32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17];
        let stream = interleave(entry, &data);
        assert_eq!(&stream[..16], &data);
        assert_eq!(&stream[16..], &[196, 35, 39, 119, 235, 215, 231, 226, 93, 23]);
    }

    #[test]
    fn test_two_groups_interleave_order() {
        // 5-Q: 2 blocks of 15 then 2 blocks of 16
        let entry = CapacityEntry::get(Version::new(5), ECLevel::Q);
        let data: Vec<u8> = (0..62).collect();
        let blocks = split_blocks(entry, &data);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].data[0], 0);
        assert_eq!(blocks[1].data[0], 15);
        assert_eq!(blocks[2].data[0], 30);
        assert_eq!(blocks[3].data[0], 46);
        assert!(blocks.iter().all(|b| b.ec.len() == 18));

        let stream = interleave(entry, &data);
        assert_eq!(stream.len(), 134);
        assert_eq!(&stream[..8], &[0, 15, 30, 46, 1, 16, 31, 47]);
        // Column 14 is the last one every block has; column 15 only the long blocks.
        assert_eq!(&stream[56..62], &[14, 29, 44, 60, 45, 61]);
        assert_eq!(stream[62], blocks[0].ec[0]);
        assert_eq!(stream[63], blocks[1].ec[0]);
        assert_eq!(stream[133], blocks[3].ec[17]);
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Line-oriented annotation text format.
//!
//! One annotation per line: `<damageType> <x>,<y>,<x2>,<y2>`, all integers.
//! This is the on-disk contract shared with existing stored data, so
//! [`encode`] must stay byte-compatible with it.
//!
//! Decoding is tolerant: a malformed line is dropped and logged, it never
//! fails the whole payload.

use crate::models::annotation::{AnnotationRecord, BoxGeom, DamageType};
use std::fmt::Write;

/// Why a single line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineError {
    MissingCoordinates,
    BadDamageType,
    WrongArity(usize),
    BadNumber(String),
    /// Corner pair whose extent does not fit in an `i64`
    Overflow,
}

/// Decode persisted text into records, in line order.
///
/// Inverted coordinate pairs are kept as negative extents.
pub fn decode(text: &str) -> Vec<AnnotationRecord> {
    let mut records = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_line(line) {
            Ok((damage_type, geometry)) => {
                let index = records.len() as u32;
                records.push(AnnotationRecord::stored(index, damage_type, geometry));
            }
            Err(e) => log::warn!("Skipping annotation line {:?}: {:?}", line, e),
        }
    }

    records
}

fn parse_line(line: &str) -> Result<(DamageType, BoxGeom), LineError> {
    let (damage_token, coords) = line
        .split_once(' ')
        .ok_or(LineError::MissingCoordinates)?;

    let coords = coords.trim();
    if coords.is_empty() {
        return Err(LineError::MissingCoordinates);
    }

    let code: u32 = damage_token
        .parse()
        .map_err(|_| LineError::BadDamageType)?;

    let values = coords
        .split(',')
        .map(|v| {
            let v = v.trim();
            v.parse::<i64>().map_err(|_| LineError::BadNumber(v.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let &[x, y, x2, y2] = values.as_slice() else {
        return Err(LineError::WrongArity(values.len()));
    };

    let geometry = BoxGeom::from_corners(x, y, x2, y2).ok_or(LineError::Overflow)?;
    Ok((DamageType::from_code(code), geometry))
}

/// Encode records in their current order, one per line, no trailing newline.
pub fn encode(records: &[AnnotationRecord]) -> String {
    let mut text = String::new();
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        let g = &record.geometry;
        // Writing to a String cannot fail
        let _ = write!(
            text,
            "{} {},{},{},{}",
            record.damage_type.code(),
            g.x,
            g.y,
            g.x2(),
            g.y2()
        );
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(records: &[AnnotationRecord]) -> Vec<(DamageType, BoxGeom)> {
        records.iter().map(|r| (r.damage_type, r.geometry)).collect()
    }

    #[test]
    fn test_end_to_end_example() {
        let input = "0 100,150,200,250\n1 0,0,10,10";
        let records = decode(input);

        assert_eq!(
            content(&records),
            vec![
                (DamageType::Scratch, BoxGeom::new(100, 150, 100, 100)),
                (DamageType::Dent, BoxGeom::new(0, 0, 10, 10)),
            ]
        );
        assert_eq!(encode(&records), input);
    }

    #[test]
    fn test_malformed_lines_are_dropped_in_order() {
        let input = "0 10,10,50,50\ngarbage line\n1 5,5,5\n2 1,2,3,4";
        let records = decode(input);

        assert_eq!(
            content(&records),
            vec![
                (DamageType::Scratch, BoxGeom::new(10, 10, 40, 40)),
                (DamageType::Broken, BoxGeom::new(1, 2, 2, 2)),
            ]
        );
    }

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(parse_line("0"), Err(LineError::MissingCoordinates));
        assert_eq!(parse_line("x 1,2,3,4"), Err(LineError::BadDamageType));
        assert_eq!(parse_line("0 1,2,3,4,5"), Err(LineError::WrongArity(5)));
        assert_eq!(parse_line("0 1,2,3"), Err(LineError::WrongArity(3)));
        assert_eq!(
            parse_line("0 1,2,3.5,4"),
            Err(LineError::BadNumber("3.5".to_string()))
        );
        assert_eq!(parse_line("0 1,,3,4"), Err(LineError::BadNumber(String::new())));
    }

    #[test]
    fn test_overflowing_extent_drops_only_that_line() {
        let input = "0 10,10,50,50\n0 -9223372036854775808,0,9223372036854775807,1\n1 0,-9223372036854775808,1,9223372036854775807";
        let records = decode(input);

        assert_eq!(
            content(&records),
            vec![(DamageType::Scratch, BoxGeom::new(10, 10, 40, 40))]
        );
        assert_eq!(
            parse_line("0 -9223372036854775808,0,9223372036854775807,1"),
            Err(LineError::Overflow)
        );
    }

    #[test]
    fn test_out_of_range_integers_rejected() {
        assert_eq!(
            parse_line("0 1,2,3,9223372036854775808"),
            Err(LineError::BadNumber("9223372036854775808".to_string()))
        );
        assert_eq!(parse_line("4294967296 1,2,3,4"), Err(LineError::BadDamageType));
        assert_eq!(parse_line("-1 1,2,3,4"), Err(LineError::BadDamageType));
    }

    #[test]
    fn test_extreme_but_representable_corners_round_trip() {
        let input = "2 -9223372036854775808,0,-1,5";
        let records = decode(input);
        assert_eq!(records.len(), 1);
        assert_eq!(encode(&records), input);
    }

    #[test]
    fn test_empty_input_decodes_to_nothing() {
        assert!(decode("").is_empty());
        assert!(decode("\n  \n\r\n").is_empty());
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_whitespace_and_crlf_tolerated() {
        let records = decode("  3 1, 2, 30 ,40  \r\n\r\n7 0,0,1,1\r\n");
        assert_eq!(
            content(&records),
            vec![
                (DamageType::Unclassified, BoxGeom::new(1, 2, 29, 38)),
                (DamageType::Other(7), BoxGeom::new(0, 0, 1, 1)),
            ]
        );
    }

    #[test]
    fn test_inverted_pairs_kept_negative() {
        let records = decode("2 50,60,10,20");
        assert_eq!(records[0].geometry, BoxGeom::new(50, 60, -40, -40));
        assert_eq!(encode(&records), "2 50,60,10,20");
    }

    #[test]
    fn test_decoded_ids_follow_accepted_order() {
        use crate::models::annotation::RecordId;

        let records = decode("0 1,1,2,2\nbad\n1 3,3,4,4");
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId::Stored(0), RecordId::Stored(1)]);
        assert!(records.iter().all(|r| !r.is_new));
    }

    /// Deterministic pseudo-random source for generated record lists.
    struct Lcg(u64);

    impl Lcg {
        fn below(&mut self, bound: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 33) % bound
        }
    }

    #[test]
    fn test_round_trip_generated_lists() {
        let mut rng = Lcg(0x5eed);
        for round in 0..300 {
            let len = rng.below(40) as u32;
            // Every third round uses coordinates far beyond any photograph
            let extent = if round % 3 == 0 { 1 << 40 } else { 6000 };
            let records: Vec<AnnotationRecord> = (0..len)
                .map(|i| {
                    let geometry = BoxGeom::new(
                        rng.below(extent) as i64,
                        rng.below(extent) as i64,
                        rng.below(extent) as i64,
                        rng.below(extent) as i64,
                    );
                    AnnotationRecord::stored(i, DamageType::from_code(rng.below(8) as u32), geometry)
                })
                .collect();

            assert_eq!(decode(&encode(&records)), records, "round {}", round);
        }
    }

    #[test]
    fn test_round_trip_preserves_order_and_content() {
        let records: Vec<AnnotationRecord> = (0..25u32)
            .map(|i| {
                let geometry = BoxGeom::new(
                    i64::from(i * 37 % 1000),
                    i64::from(i * 53 % 800),
                    i64::from(i % 7),
                    i64::from(i * 11 % 300),
                );
                AnnotationRecord::stored(i, DamageType::from_code(i % 5), geometry)
            })
            .rev()
            .collect();

        let decoded = decode(&encode(&records));
        assert_eq!(content(&decoded), content(&records));
    }
}

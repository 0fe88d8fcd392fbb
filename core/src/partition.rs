//! Heat partitioning.
//!
//! Participants are consumed in input order and packed row-major: block 1's
//! tracks left to right, then block 2, and so on. A new tanda starts whenever
//! the current one holds `blocks × tracksPerBlock` participants. Only the last
//! tanda may be partially filled, and blocks past its last participant are
//! left out rather than emitted empty.
//!
//! The output depends only on the input order, so generating twice gives the
//! same preview, identifiers included.

use crate::error::ValidationError;
use crate::stage::{max_tracks_for, StageLayout, MAX_BLOCKS};
use crate::types::{Block, LiveCompetitionId, Participant, ParticipantId, Phase, Tanda, TandaStatus, TrackAssignment};
use std::collections::HashSet;

/// Partition `participants` into heats for `phase` of `cell`.
///
/// Produces `ceil(P / capacity)` tandas; an empty input yields no tandas.
///
/// # Errors
///
/// - [`ValidationError::DuplicateParticipant`] if a participant is listed twice.
/// - A bounds error if `layout` has zero blocks or zero tracks.
pub fn partition(
    cell: &LiveCompetitionId,
    phase: Phase,
    participants: &[Participant],
    layout: StageLayout,
) -> Result<Vec<Tanda>, ValidationError> {
    check_layout(layout)?;
    ensure_unique(participants.iter().map(|participant| participant.id))?;

    let tandas = participants
        .chunks(layout.capacity())
        .zip(1u32..)
        .map(|(heat, number)| Tanda {
            id: Tanda::id_for(cell, phase, number),
            live_competition_id: cell.clone(),
            phase,
            number,
            blocks: pack_blocks(heat, layout.tracks_per_block),
            status: TandaStatus::Pending,
        })
        .collect();

    Ok(tandas)
}

fn pack_blocks(heat: &[Participant], tracks_per_block: u8) -> Vec<Block> {
    heat.chunks(usize::from(tracks_per_block))
        .zip(1u8..)
        .map(|(lanes, number)| Block {
            number,
            tracks: lanes
                .iter()
                .zip(1u8..)
                .map(|(participant, track)| TrackAssignment {
                    track,
                    participant_id: participant.id,
                })
                .collect(),
        })
        .collect()
}

/// Check a heat set against the stage layout before it is persisted.
///
/// Every tanda must belong to `cell`/`phase`, be numbered `1..=N` in order
/// with the identifier derived from that number, and use between one and
/// `blocks` blocks of between one and `tracksPerBlock` tracks. No
/// participant may appear twice.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_heats(
    cell: &LiveCompetitionId,
    phase: Phase,
    tandas: &[Tanda],
    layout: StageLayout,
) -> Result<(), ValidationError> {
    if tandas.is_empty() {
        return Err(ValidationError::NoTandas {
            cell: cell.clone(),
            phase,
        });
    }

    for (tanda, expected) in tandas.iter().zip(1u32..) {
        if tanda.live_competition_id != *cell || tanda.phase != phase {
            return Err(ValidationError::ForeignTanda {
                tanda: tanda.id.clone(),
                cell: cell.clone(),
                phase,
            });
        }
        if tanda.number != expected {
            return Err(ValidationError::TandaNumbering {
                tanda: tanda.id.clone(),
                expected,
                got: tanda.number,
            });
        }
        let derived = Tanda::id_for(cell, phase, tanda.number);
        if tanda.id != derived {
            return Err(ValidationError::TandaIdMismatch {
                tanda: tanda.id.clone(),
                expected: derived,
            });
        }
        if tanda.blocks.is_empty() {
            return Err(ValidationError::EmptyHeat {
                tanda: tanda.id.clone(),
                what: "heat".to_string(),
            });
        }
        if let Some(block) = tanda.blocks.iter().find(|block| block.tracks.is_empty()) {
            return Err(ValidationError::EmptyHeat {
                tanda: tanda.id.clone(),
                what: format!("block {}", block.number),
            });
        }
        if tanda.blocks.len() > usize::from(layout.blocks) {
            return Err(ValidationError::TandaOverCapacity {
                tanda: tanda.id.clone(),
                reason: format!("{} blocks on a {}-block stage", tanda.blocks.len(), layout.blocks),
            });
        }
        if let Some(block) = tanda
            .blocks
            .iter()
            .find(|block| block.tracks.len() > usize::from(layout.tracks_per_block))
        {
            return Err(ValidationError::TandaOverCapacity {
                tanda: tanda.id.clone(),
                reason: format!(
                    "block {} has {} tracks, the stage has {}",
                    block.number,
                    block.tracks.len(),
                    layout.tracks_per_block
                ),
            });
        }
    }

    ensure_unique(tandas.iter().flat_map(Tanda::participants))
}

fn check_layout(layout: StageLayout) -> Result<(), ValidationError> {
    if layout.blocks == 0 {
        return Err(ValidationError::BlocksOutOfRange {
            got: 0,
            max: MAX_BLOCKS,
        });
    }
    if layout.tracks_per_block == 0 {
        return Err(ValidationError::TracksOutOfRange {
            got: 0,
            max: max_tracks_for(layout.blocks),
            blocks: layout.blocks,
        });
    }
    Ok(())
}

fn ensure_unique(ids: impl Iterator<Item = ParticipantId>) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateParticipant(id));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{AcademyId, Category, Gender, LevelId, UserId};
    use proptest::prelude::*;

    fn cell() -> LiveCompetitionId {
        LiveCompetitionId::for_cell(&LevelId::new("Seriado"), &Category::new("Adulto"), Gender::Mixto)
    }

    fn participants(count: usize) -> Vec<Participant> {
        (0..count)
            .map(|_| Participant {
                id: ParticipantId::new(),
                users_id: UserId::new(),
                academies_id: AcademyId::new(),
                level: LevelId::new("Seriado"),
                category: Category::new("Adulto"),
                phase: Phase::Final,
                gender: None,
            })
            .collect()
    }

    const fn layout(blocks: u8, tracks_per_block: u8) -> StageLayout {
        StageLayout {
            blocks,
            tracks_per_block,
        }
    }

    #[test]
    fn ten_participants_on_two_by_three_gives_six_and_four() {
        let tandas = partition(&cell(), Phase::Final, &participants(10), layout(2, 3)).unwrap();
        let sizes: Vec<usize> = tandas.iter().map(Tanda::participant_count).collect();
        assert_eq!(sizes, vec![6, 4]);
    }

    #[test]
    fn fills_row_major() {
        let input = participants(5);
        let tandas = partition(&cell(), Phase::Final, &input, layout(2, 3)).unwrap();
        let tanda = &tandas[0];

        assert_eq!(tanda.blocks.len(), 2);
        assert_eq!(tanda.blocks[0].tracks.len(), 3);
        assert_eq!(tanda.blocks[1].tracks.len(), 2);
        assert_eq!(tanda.blocks[0].tracks[0].participant_id, input[0].id);
        assert_eq!(tanda.blocks[0].tracks[2].participant_id, input[2].id);
        assert_eq!(tanda.blocks[1].tracks[0].participant_id, input[3].id);
        assert_eq!(tanda.blocks[1].tracks[1].track, 2);
    }

    #[test]
    fn trailing_blocks_are_omitted() {
        let tandas = partition(&cell(), Phase::Final, &participants(7), layout(4, 3)).unwrap();
        assert_eq!(tandas.len(), 1);
        assert_eq!(tandas[0].blocks.len(), 3);
    }

    #[test]
    fn identifiers_are_deterministic() {
        let input = participants(9);
        let first = partition(&cell(), Phase::Semifinal, &input, layout(1, 4)).unwrap();
        let second = partition(&cell(), Phase::Semifinal, &input, layout(1, 4)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[2].id.as_str(), "Seriado_Adulto_Mixto_Semifinal_3");
        assert_eq!(first[2].document_key(), "Semifinal_3");
    }

    #[test]
    fn empty_input_gives_no_tandas() {
        assert!(partition(&cell(), Phase::Final, &[], layout(1, 1)).unwrap().is_empty());
    }

    #[test]
    fn duplicate_participant_is_rejected() {
        let mut input = participants(3);
        input.push(input[0].clone());
        assert_eq!(
            partition(&cell(), Phase::Final, &input, layout(1, 6)),
            Err(ValidationError::DuplicateParticipant(input[0].id))
        );
    }

    #[test]
    fn zero_track_layout_is_rejected() {
        assert!(matches!(
            partition(&cell(), Phase::Final, &participants(2), layout(2, 0)),
            Err(ValidationError::TracksOutOfRange { .. })
        ));
    }

    #[test]
    fn generated_heats_pass_validation() {
        let tandas = partition(&cell(), Phase::Final, &participants(13), layout(3, 2)).unwrap();
        assert!(validate_heats(&cell(), Phase::Final, &tandas, layout(3, 2)).is_ok());
    }

    #[test]
    fn heats_for_a_bigger_stage_are_rejected() {
        let tandas = partition(&cell(), Phase::Final, &participants(8), layout(1, 4)).unwrap();
        assert!(matches!(
            validate_heats(&cell(), Phase::Final, &tandas, layout(1, 3)),
            Err(ValidationError::TandaOverCapacity { .. })
        ));
    }

    #[test]
    fn heats_of_another_round_are_rejected() {
        let tandas = partition(&cell(), Phase::Semifinal, &participants(2), layout(1, 4)).unwrap();
        assert!(matches!(
            validate_heats(&cell(), Phase::Final, &tandas, layout(1, 4)),
            Err(ValidationError::ForeignTanda { .. })
        ));
    }

    #[test]
    fn repeated_number_is_rejected() {
        let mut tandas = partition(&cell(), Phase::Final, &participants(4), layout(1, 2)).unwrap();
        tandas[1].number = 1;
        tandas[1].id = Tanda::id_for(&cell(), Phase::Final, 1);

        assert_eq!(
            validate_heats(&cell(), Phase::Final, &tandas, layout(1, 2)),
            Err(ValidationError::TandaNumbering {
                tanda: tandas[1].id.clone(),
                expected: 2,
                got: 1,
            })
        );
    }

    #[test]
    fn numbering_gap_is_rejected() {
        let mut tandas = partition(&cell(), Phase::Final, &participants(4), layout(1, 2)).unwrap();
        tandas[1].number = 3;
        tandas[1].id = Tanda::id_for(&cell(), Phase::Final, 3);

        assert!(matches!(
            validate_heats(&cell(), Phase::Final, &tandas, layout(1, 2)),
            Err(ValidationError::TandaNumbering { expected: 2, got: 3, .. })
        ));
    }

    #[test]
    fn identifier_must_follow_number() {
        let mut tandas = partition(&cell(), Phase::Final, &participants(4), layout(1, 2)).unwrap();
        tandas[0].id = Tanda::id_for(&cell(), Phase::Final, 2);

        assert_eq!(
            validate_heats(&cell(), Phase::Final, &tandas, layout(1, 2)),
            Err(ValidationError::TandaIdMismatch {
                tanda: Tanda::id_for(&cell(), Phase::Final, 2),
                expected: Tanda::id_for(&cell(), Phase::Final, 1),
            })
        );
    }

    #[test]
    fn heat_without_blocks_is_rejected() {
        let mut tandas = partition(&cell(), Phase::Final, &participants(4), layout(1, 2)).unwrap();
        tandas[1].blocks.clear();

        assert!(matches!(
            validate_heats(&cell(), Phase::Final, &tandas, layout(1, 2)),
            Err(ValidationError::EmptyHeat { ref what, .. }) if what == "heat"
        ));
    }

    #[test]
    fn block_without_tracks_is_rejected() {
        let mut tandas = partition(&cell(), Phase::Final, &participants(3), layout(2, 2)).unwrap();
        tandas[0].blocks[1].tracks.clear();

        assert!(matches!(
            validate_heats(&cell(), Phase::Final, &tandas, layout(2, 2)),
            Err(ValidationError::EmptyHeat { ref what, .. }) if what == "block 2"
        ));
    }

    #[test]
    fn empty_heat_set_is_rejected() {
        assert!(matches!(
            validate_heats(&cell(), Phase::Final, &[], layout(1, 4)),
            Err(ValidationError::NoTandas { .. })
        ));
    }

    proptest! {
        #[test]
        fn every_participant_lands_in_exactly_one_tanda(
            count in 0usize..60,
            blocks in 1u8..=4,
            tracks in 1u8..=4,
        ) {
            let input = participants(count);
            let stage = layout(blocks, tracks);
            let capacity = stage.capacity();
            let tandas = partition(&cell(), Phase::Eliminatoria, &input, stage).unwrap();

            prop_assert_eq!(tandas.len(), count.div_ceil(capacity));
            prop_assert!(tandas.iter().all(|tanda| tanda.participant_count() <= capacity));

            if let Some(last) = tandas.last() {
                let expected = if count % capacity == 0 { capacity } else { count % capacity };
                prop_assert_eq!(last.participant_count(), expected);
            }

            let placed: Vec<ParticipantId> = tandas.iter().flat_map(Tanda::participants).collect();
            let expected: Vec<ParticipantId> = input.iter().map(|participant| participant.id).collect();
            prop_assert_eq!(placed, expected);
        }
    }
}

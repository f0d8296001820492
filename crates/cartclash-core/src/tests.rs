#[cfg(test)]
mod tests {
    use glam::Vec3;

    use crate::commands::{PerkRequest, SimCommand};
    use crate::components::{BumperPhase, BumperState};
    use crate::constants::*;
    use crate::enums::*;
    use crate::events::SimEvent;
    use crate::state::SimSnapshot;
    use crate::types::*;

    /// Every timing constant must land on a whole tick.
    #[test]
    fn test_timings_are_whole_ticks() {
        let timings = [
            ANTI_STALL_INITIAL_SECS,
            ANTI_STALL_GRACE_SECS,
            CART_DISPOSE_DELAY_SECS,
            ACCESSORY_DISPOSE_DELAY_SECS,
            BUMPER_ARMING_SECS,
            TAG_IMMUNITY_SECS,
            STUN_SECS,
            ROUND_UNANCHOR_DELAY_SECS,
            ROUND_SEAT_DELAY_SECS,
            ROUND_SETTLE_SECS,
        ];
        for secs in timings {
            let ticks = secs * TICK_RATE as f64;
            assert_eq!(ticks, ticks.round(), "{secs}s is not a whole tick count");
        }
        assert_eq!(secs_to_ticks(ANTI_STALL_INITIAL_SECS), 720);
        assert_eq!(secs_to_ticks(ANTI_STALL_GRACE_SECS), 90);
        assert_eq!(secs_to_ticks(ROUND_SEAT_DELAY_SECS), 30);
    }

    #[test]
    fn test_secs_to_ticks_clamps_negative() {
        assert_eq!(secs_to_ticks(-1.0), 0);
        assert_eq!(secs_to_ticks(0.0), 0);
    }

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        for _ in 0..TICK_RATE {
            time.advance();
        }
        assert_eq!(time.tick, TICK_RATE as u64);
        assert!((time.elapsed_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_transform_forward_and_offset() {
        let pose = Transform::at(Vec3::new(10.0, 0.0, 5.0));
        assert_eq!(pose.forward(), CART_FORWARD);

        let bumper = pose.offset(Vec3::from_array(BUMPER_OFFSET));
        assert!((bumper.position - Vec3::new(10.0, 0.0, 2.4)).length() < 1e-5);

        // Turned 90 degrees left: forward becomes -X.
        let turned = Transform::new(
            Vec3::ZERO,
            glam::Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        assert!((turned.forward() - Vec3::NEG_X).length() < 1e-5);
        let local = turned.to_local_direction(Vec3::NEG_X);
        assert!((local - CART_FORWARD).length() < 1e-5);
    }

    #[test]
    fn test_round_phase_liveness() {
        assert!(!RoundPhase::Intermission.is_live());
        assert!(!RoundPhase::Starting.is_live());
        assert!(RoundPhase::InProgress.is_live());
        assert!(!RoundPhase::Ended.is_live());
    }

    #[test]
    fn test_defeat_cause_display() {
        assert_eq!(DefeatCause::NeverEnteredCart.to_string(), "never entered cart");
        assert_eq!(DefeatCause::AbandonedCart.to_string(), "abandoned cart");
        let rammed = DefeatCause::RammedBy {
            attacker: PlayerId(7),
        };
        assert_eq!(rammed.to_string(), "rammed by player 7");
    }

    #[test]
    fn test_bumper_handle_tracks_phase() {
        let mut bumper = BumperState {
            uses_remaining: 3,
            damage_per_hit: 1.0,
            phase: BumperPhase::Arming,
            attached_tick: 0,
            parts: Vec::new(),
        };
        assert!(!bumper.is_active());
        assert_eq!(bumper.frame_handle(), None);

        bumper.phase = BumperPhase::Active(FrameHandle(4));
        assert!(bumper.is_active());
        assert_eq!(bumper.frame_handle(), Some(FrameHandle(4)));
    }

    /// Commands arrive as JSON from the match server.
    #[test]
    fn test_command_from_json() {
        let json = r#"{"type":"CreateCart","player":3,"kind":"Classic"}"#;
        let cmd: SimCommand = serde_json::from_str(json).unwrap();
        match cmd {
            SimCommand::CreateCart {
                player,
                kind,
                customization,
            } => {
                assert_eq!(player, PlayerId(3));
                assert_eq!(kind, "Classic");
                assert!(customization.parts.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }

        let json = r#"{"type":"AttachPerks","player":1,"perks":{"fuel":0.0,"boost_strength":0.0,"shield_uses":2,"damage_per_hit":2.5}}"#;
        let cmd: SimCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(
            cmd,
            SimCommand::AttachPerks {
                perks: PerkRequest { shield_uses: 2, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_snapshot_serializes_events() {
        let snapshot = SimSnapshot {
            events: vec![
                SimEvent::Defeated {
                    player: PlayerId(2),
                    cause: DefeatCause::RammedBy {
                        attacker: PlayerId(1),
                    },
                },
                SimEvent::RoundStarted,
            ],
            ..Default::default()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""type":"RammedBy""#));
        let back: SimSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.events, snapshot.events);
    }
}

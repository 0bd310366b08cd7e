//! Tick driver: runs the jump engine for every eligible player

use tracing::{debug, trace};

use super::engine::{JumpOutcome, JumpSystem, EXTRA_JUMP_IMPULSE};
use super::slots::JumpTable;
use super::world::World;

/// Counters for a single driver pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Players whose motion state was evaluated
    pub evaluated: usize,
    /// Extra-jump impulses written to the world
    pub impulses: usize,
    /// Entitled players skipped because their pawn was unavailable
    pub skipped_unavailable: usize,
}

pub struct TickDriver {
    impulse: f32,
}

impl TickDriver {
    pub fn new(impulse: f32) -> Self {
        Self { impulse }
    }

    /// Evaluate every connected, human, alive player that holds an entitlement
    pub fn run<W: World>(&self, table: &mut JumpTable, world: &mut W) -> TickReport {
        let mut report = TickReport::default();

        for player in world.players() {
            if player.is_bot || !player.alive {
                continue;
            }

            if !table.is_active(player.slot) {
                continue;
            }

            let Some(sample) = world.sample(player.slot) else {
                report.skipped_unavailable += 1;
                continue;
            };

            let Some(record) = table.record_mut(player.slot) else {
                continue;
            };

            let limit = record.entitlement.extra_jump_limit;
            let outcome = JumpSystem::evaluate(&mut record.motion, limit, sample);
            report.evaluated += 1;

            match outcome {
                JumpOutcome::ExtraJump { used } => {
                    world.set_vertical_velocity(player.slot, self.impulse);
                    report.impulses += 1;
                    debug!(slot = %player.slot, used, limit, "Extra jump");
                }
                JumpOutcome::Exhausted => {
                    trace!(slot = %player.slot, limit, "Extra jumps exhausted, press absorbed");
                }
                _ => {}
            }
        }

        report
    }
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new(EXTRA_JUMP_IMPULSE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::slots::Entitlement;
    use crate::game::world::HeadlessWorld;
    use crate::game::{ItemId, MotionSample, Slot};

    fn setup(limit: u32) -> (TickDriver, JumpTable, HeadlessWorld) {
        let mut table = JumpTable::new(8);
        table
            .grant(Slot(5), Entitlement::new(limit, ItemId(1)))
            .unwrap();
        let mut world = HeadlessWorld::new();
        world.connect(Slot(5), false);
        (TickDriver::default(), table, world)
    }

    fn step(
        driver: &TickDriver,
        table: &mut JumpTable,
        world: &mut HeadlessWorld,
        grounded: bool,
        pressed: bool,
    ) -> TickReport {
        world.set_input(Slot(5), MotionSample::new(grounded, pressed));
        driver.run(table, world)
    }

    #[test]
    fn extra_jump_overwrites_vertical_velocity() {
        let (driver, mut table, mut world) = setup(1);
        step(&driver, &mut table, &mut world, false, false);
        let report = step(&driver, &mut table, &mut world, false, true);

        assert_eq!(report.impulses, 1);
        assert_eq!(world.vertical_velocity(Slot(5)), Some(EXTRA_JUMP_IMPULSE));
        assert_eq!(table.motion(Slot(5)).unwrap().extra_jumps_used, 1);
    }

    #[test]
    fn ground_jump_leaves_velocity_untouched() {
        let (driver, mut table, mut world) = setup(2);
        step(&driver, &mut table, &mut world, true, false);
        let report = step(&driver, &mut table, &mut world, false, true);

        assert_eq!(report.impulses, 0);
        assert_eq!(world.vertical_velocity(Slot(5)), Some(0.0));
        assert_eq!(table.motion(Slot(5)).unwrap().extra_jumps_used, 0);
    }

    #[test]
    fn players_without_entitlement_are_skipped() {
        let (driver, mut table, mut world) = setup(1);
        world.connect(Slot(2), false);
        world.set_input(Slot(2), MotionSample::new(false, true));

        let report = driver.run(&mut table, &mut world);

        assert_eq!(report.evaluated, 1);
        assert!(!table.is_active(Slot(2)));
        assert_eq!(world.vertical_velocity(Slot(2)), Some(0.0));
    }

    #[test]
    fn bots_and_dead_players_are_skipped() {
        let (driver, mut table, mut world) = setup(1);
        table
            .grant(Slot(6), Entitlement::new(1, ItemId(1)))
            .unwrap();
        world.connect(Slot(6), true);
        world.set_alive(Slot(5), false);

        let report = driver.run(&mut table, &mut world);

        assert_eq!(report, TickReport::default());
    }

    #[test]
    fn unavailable_pawn_skips_without_mutation() {
        let (driver, mut table, mut world) = setup(1);
        step(&driver, &mut table, &mut world, false, false);
        world.set_pawn_available(Slot(5), false);

        let report = step(&driver, &mut table, &mut world, false, true);

        assert_eq!(report.skipped_unavailable, 1);
        assert_eq!(report.evaluated, 0);
        let motion = table.motion(Slot(5)).unwrap();
        assert!(!motion.last_jump_pressed);
        assert_eq!(motion.extra_jumps_used, 0);

        // Press is still a fresh edge once the pawn is back
        world.set_pawn_available(Slot(5), true);
        let report = driver.run(&mut table, &mut world);
        assert_eq!(report.impulses, 1);
    }

    #[test]
    fn revoked_slot_does_no_work() {
        let (driver, mut table, mut world) = setup(3);
        table.revoke(Slot(5));

        let report = step(&driver, &mut table, &mut world, false, true);

        assert_eq!(report, TickReport::default());
        assert_eq!(world.vertical_velocity(Slot(5)), Some(0.0));
    }

    #[test]
    fn custom_impulse_is_applied() {
        let (_, mut table, mut world) = setup(1);
        let driver = TickDriver::new(450.0);
        step(&driver, &mut table, &mut world, false, false);
        step(&driver, &mut table, &mut world, false, true);

        assert_eq!(world.vertical_velocity(Slot(5)), Some(450.0));
    }
}

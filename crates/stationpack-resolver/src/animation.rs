//! Station tile animation.

use crate::resolver::resolve_callback;
use crate::world::{GameContext, World};
use stationpack_core::callback::{CALLBACK_FAILED, CallbackId, StationCallback};
use stationpack_core::id::PackId;
use stationpack_core::rng::RandomSource;
use stationpack_core::spec::{AnimationStatus, StationSpecFlag};
use stationpack_core::station::StationPool;
use stationpack_core::tile::TilePos;
use stationpack_spatial::TileGrid;
use tracing::debug;

/// Slowest animation speed: one frame every 2^16 ticks.
pub const MAX_ANIMATION_SPEED: u8 = 16;

const ANIM_NO_CHANGE: u16 = 0xFD;
const ANIM_START: u16 = 0xFE;
const ANIM_STOP: u16 = 0xFF;

/// Apply the answer of an animation-trigger callback to a tile: stop, start,
/// or jump to a frame and start. Bits 8..14 name a sound to play.
pub fn apply_animation_trigger_result<G: TileGrid + ?Sized>(
    grid: &mut G,
    tile: TilePos,
    pack: PackId,
    result: u16,
) {
    if result == CALLBACK_FAILED {
        return;
    }
    match result & 0xFF {
        ANIM_NO_CHANGE => {}
        ANIM_START => grid.add_animated_tile(tile),
        ANIM_STOP => grid.delete_animated_tile(tile),
        frame => {
            grid.set_animation_frame(tile, frame as u8);
            grid.add_animated_tile(tile);
        }
    }
    play_result_sound(grid, tile, pack, result);
}

fn play_result_sound<G: TileGrid + ?Sized>(grid: &mut G, tile: TilePos, pack: PackId, result: u16) {
    let sound = ((result >> 8) & 0x7F) as u8;
    if sound != 0 {
        grid.play_sound(tile, pack, sound);
    }
}

/// Advance the animation of one station tile for game tick `tick`.
///
/// The frame only moves on ticks that are a multiple of `1 << speed`.
/// Returns whether the tile was processed on this tick.
pub fn animate_station_tile<G: TileGrid>(
    ctx: GameContext<'_>,
    stations: &StationPool,
    grid: &mut G,
    tile: TilePos,
    tick: u64,
    rng: &mut dyn RandomSource,
) -> bool {
    let Some(station) = grid.station_tile(tile).map(|t| t.station) else {
        return false;
    };

    let (pack, next, frame, num_frames, looping) = {
        let world = World::new(ctx, stations, &*grid);
        let Some(spec) = world.tile_spec(tile) else {
            return false;
        };

        let mut speed = spec.animation.speed;
        if spec.has_callback(StationCallback::AnimationSpeed) {
            let (result, _) = resolve_callback(
                world,
                spec,
                Some(station),
                Some(tile),
                CallbackId::AnimationSpeed,
                0,
                0,
            );
            if result != CALLBACK_FAILED {
                if result >= 0x100 && spec.pack.is_modern() {
                    debug!(result, "animation speed callback out of range");
                }
                speed = ((result & 0xFF) as u8).min(MAX_ANIMATION_SPEED);
            }
        }
        if tick % (1u64 << speed.min(MAX_ANIMATION_SPEED)) != 0 {
            return false;
        }

        let next = if spec.has_callback(StationCallback::AnimationNextFrame) {
            let random = if spec.has_flag(StationSpecFlag::Cb141RandomBits) {
                rng.next_u32()
            } else {
                0
            };
            let (result, _) = resolve_callback(
                world,
                spec,
                Some(station),
                Some(tile),
                CallbackId::AnimationNextFrame,
                random,
                0,
            );
            (result != CALLBACK_FAILED).then_some(result)
        } else {
            None
        };

        let frame = world
            .grid
            .station_tile(tile)
            .map(|t| t.animation_frame)
            .unwrap_or(0);
        (
            spec.pack.id,
            next,
            frame,
            spec.animation.frames,
            spec.animation.status == AnimationStatus::Looping,
        )
    };

    let mut frame = frame;
    let mut set_by_callback = false;
    if let Some(result) = next {
        set_by_callback = true;
        match result & 0xFF {
            ANIM_STOP => grid.delete_animated_tile(tile),
            ANIM_START => set_by_callback = false,
            f => frame = f as u8,
        }
        play_result_sound(grid, tile, pack, result);
    }

    if !set_by_callback {
        if frame < num_frames {
            frame += 1;
        } else if frame == num_frames && looping {
            frame = 0;
        } else {
            grid.delete_animated_tile(tile);
        }
    }

    grid.set_animation_frame(tile, frame);
    grid.mark_dirty(tile);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::Fixture;
    use stationpack_core::spec::{AnimationInfo, CargoKey, StationSpec};
    use stationpack_core::sprite_group::SpriteGroup;
    use stationpack_core::test_utils::*;
    use stationpack_core::tile::Axis;
    use stationpack_spatial::PlayedSound;

    const T: TilePos = TilePos { x: 3, y: 3 };

    fn animated_spec(frames: u8, status: AnimationStatus, speed: u8) -> StationSpec {
        let mut spec = sprite_spec(0, test_pack());
        spec.animation = AnimationInfo {
            frames,
            status,
            speed,
            ..AnimationInfo::default()
        };
        spec
    }

    fn setup(spec: StationSpec) -> Fixture {
        let (mut fx, ids) = Fixture::new(vec![spec]);
        let sid = fx.add_station(T, 1, 1, Axis::X);
        fx.assign_spec(sid, ids[0], T, 1, 1);
        fx.grid.add_animated_tile(T);
        fx
    }

    fn step(fx: &mut Fixture, tick: u64) -> bool {
        let mut rng = SequenceRng::constant(0);
        let (ctx, stations, grid) = fx.parts();
        animate_station_tile(ctx, stations, grid, T, tick, &mut rng)
    }

    fn frame(fx: &Fixture) -> u8 {
        fx.grid.station_tile(T).unwrap().animation_frame
    }

    #[test]
    fn speed_gates_ticks() {
        let mut fx = setup(animated_spec(5, AnimationStatus::Looping, 2));
        assert!(!step(&mut fx, 1));
        assert_eq!(frame(&fx), 0);
        assert!(step(&mut fx, 4));
        assert_eq!(frame(&fx), 1);
        assert!(fx.grid.is_dirty(T));
    }

    #[test]
    fn looping_wraps_and_non_looping_stops() {
        let mut fx = setup(animated_spec(2, AnimationStatus::Looping, 0));
        for _ in 0..3 {
            step(&mut fx, 0);
        }
        assert_eq!(frame(&fx), 0);
        assert!(fx.grid.is_animated(T));

        let mut fx = setup(animated_spec(2, AnimationStatus::NonLooping, 0));
        for _ in 0..3 {
            step(&mut fx, 0);
        }
        assert_eq!(frame(&fx), 2);
        assert!(!fx.grid.is_animated(T));
    }

    #[test]
    fn next_frame_callback_sets_frame_and_sound() {
        let mut spec = animated_spec(10, AnimationStatus::Looping, 0);
        spec.callback_mask = [StationCallback::AnimationNextFrame].into_iter().collect();
        spec.sprite_groups.insert(CargoKey::Default, SpriteGroup::callback(0x0307));
        let mut fx = setup(spec);
        step(&mut fx, 0);
        assert_eq!(frame(&fx), 7);
        assert_eq!(
            fx.grid.sounds(),
            &[PlayedSound {
                tile: T,
                pack: TEST_PACK_ID,
                sound: 3
            }]
        );
    }

    #[test]
    fn next_frame_callback_can_defer_or_stop() {
        let mut spec = animated_spec(10, AnimationStatus::Looping, 0);
        spec.callback_mask = [StationCallback::AnimationNextFrame].into_iter().collect();
        spec.sprite_groups.insert(CargoKey::Default, SpriteGroup::callback(ANIM_START));
        let mut fx = setup(spec.clone());
        step(&mut fx, 0);
        assert_eq!(frame(&fx), 1);

        spec.sprite_groups.insert(CargoKey::Default, SpriteGroup::callback(ANIM_STOP));
        let mut fx = setup(spec);
        step(&mut fx, 0);
        assert_eq!(frame(&fx), 0);
        assert!(!fx.grid.is_animated(T));
    }

    #[test]
    fn speed_callback_overrides_and_clamps() {
        let mut spec = animated_spec(10, AnimationStatus::Looping, 0);
        spec.callback_mask = [StationCallback::AnimationSpeed].into_iter().collect();
        spec.sprite_groups.insert(CargoKey::Default, SpriteGroup::callback(40));
        let mut fx = setup(spec);
        assert!(!step(&mut fx, 1 << 15));
        assert!(step(&mut fx, 1 << 16));
    }

    #[test]
    fn trigger_results() {
        let mut grid = stationpack_spatial::TileMap::new(8, 8);
        apply_animation_trigger_result(&mut grid, T, TEST_PACK_ID, CALLBACK_FAILED);
        assert!(!grid.is_animated(T));
        apply_animation_trigger_result(&mut grid, T, TEST_PACK_ID, ANIM_START);
        assert!(grid.is_animated(T));
        apply_animation_trigger_result(&mut grid, T, TEST_PACK_ID, ANIM_NO_CHANGE);
        assert!(grid.is_animated(T));
        apply_animation_trigger_result(&mut grid, T, TEST_PACK_ID, ANIM_STOP | 0x0500);
        assert!(!grid.is_animated(T));
        assert_eq!(grid.sounds().len(), 1);
        assert_eq!(grid.sounds()[0].sound, 5);
    }

    #[test]
    fn tiles_without_spec_are_skipped() {
        let (mut fx, _) = Fixture::new(vec![]);
        fx.add_station(T, 1, 1, Axis::X);
        assert!(!step(&mut fx, 0));
    }
}

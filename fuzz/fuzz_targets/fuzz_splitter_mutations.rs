#![no_main]

use arbitrary::Arbitrary;
use gridsplit_backend::PointerPosition;
use gridsplit_layout::{
    Direction, ItemId, LayoutGroup, LayoutLeaf, Placement, ResizeDirection, ResizePhase, Size,
    SplitterConfig, SplitterEngine,
};
use gridsplit_web::RecordingHost;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Add {
        target: u8,
        before: bool,
        fixed_px: Option<u16>,
        half: bool,
    },
    Remove {
        target: u8,
    },
    Key {
        target: u8,
        increase: bool,
        large: bool,
    },
    Down {
        target: u8,
        at: i16,
    },
    Move {
        at: i16,
    },
    Frame,
    Up {
        at: i16,
    },
    Cancel,
}

fn seed() -> LayoutGroup {
    LayoutGroup::new("root", Direction::Columns)
        .with_item(LayoutLeaf::new("l0", Size::px(120.0)))
        .with_item(
            LayoutGroup::new("g0", Direction::Rows)
                .with_item(LayoutLeaf::new("l1", Size::fr(1.0)))
                .with_item(LayoutLeaf::new("l2", Size::px(60.0))),
        )
        .with_item(LayoutLeaf::new("l3", Size::fr(2.0)))
}

fn pick(engine: &SplitterEngine<RecordingHost>, target: u8) -> Option<ItemId> {
    let index = engine.index()?;
    let ids = index.subtree_ids(index.root().as_str());
    ids.get(1 + usize::from(target) % ids.len().saturating_sub(1).max(1))
        .cloned()
}

fn pos(at: i16) -> PointerPosition {
    let at = f64::from(at);
    PointerPosition::new(at, at)
}

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 256 {
        return;
    }
    let host = RecordingHost::new()
        .with_container("root", 1280.0)
        .with_container("g0", 720.0);
    let Ok(mut engine) = SplitterEngine::with_model(host, SplitterConfig::default(), &seed())
    else {
        return;
    };
    let mut fresh = 0u32;

    for op in ops {
        match op {
            Op::Add {
                target,
                before,
                fixed_px,
                half,
            } => {
                let Some(sibling) = pick(&engine, target) else {
                    continue;
                };
                let Some(parent) = engine.index().and_then(|i| i.parent(sibling.as_str())).cloned()
                else {
                    continue;
                };
                fresh += 1;
                let size = fixed_px.map_or(Size::fr(1.0), |px| Size::px(f64::from(px)));
                let placement = if before { Placement::Before } else { Placement::After };
                // Rejections (drag in progress) are expected; panics are not.
                let _ = engine.add_sibling_leaf(
                    parent.as_str(),
                    sibling.as_str(),
                    placement,
                    LayoutLeaf::new(format!("n{fresh}"), size),
                    half,
                );
            }
            Op::Remove { target } => {
                if let Some(id) = pick(&engine, target) {
                    let _ = engine.remove_item(id.as_str());
                }
            }
            Op::Key {
                target,
                increase,
                large,
            } => {
                if let Some(bar) = pick(&engine, target) {
                    let direction = if increase {
                        ResizeDirection::Increase
                    } else {
                        ResizeDirection::Decrease
                    };
                    let _ = engine.keyboard_resize(bar.as_str(), direction, large);
                }
            }
            Op::Down { target, at } => {
                if let Some(bar) = pick(&engine, target) {
                    let _ = engine.begin_pointer_resize(bar.as_str(), pos(at));
                }
            }
            Op::Move { at } => {
                let _ = engine.pointer_move(pos(at));
            }
            Op::Frame => {
                if let Some(frame) = engine.host_mut().next_frame() {
                    let _ = engine.on_frame(frame);
                }
            }
            Op::Up { at } => {
                let _ = engine.pointer_up(pos(at));
            }
            Op::Cancel => {
                let _ = engine.disconnect();
            }
        }

        let Some(index) = engine.index() else {
            panic!("engine lost its layout");
        };
        index
            .check_invariants()
            .expect("index invariants hold after every operation");
        let host = engine.host();
        assert_eq!(
            host.listeners_attached(),
            engine.phase() == ResizePhase::Dragging,
            "listeners attached only while dragging"
        );
        assert!(host.pending_frames().len() <= 1, "at most one frame in flight");
        engine.host_mut().take_calls();
    }
});

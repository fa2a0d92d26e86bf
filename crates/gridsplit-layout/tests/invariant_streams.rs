//! Random operation streams against the public engine API.
//!
//! After every step the index must pass its own self-check, flexible budgets
//! of groups untouched by add/remove must be conserved, and the rendered
//! track list of every group must match a fresh computation.

mod common;

use common::MemoryHost;
use gridsplit_layout::{
    Direction, ItemId, LayoutGroup, LayoutIndex, LayoutLeaf, Placement, PointerPosition,
    ResizeDirection, Size, SplitterConfig, SplitterEngine,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add {
        target: usize,
        before: bool,
        fixed: Option<f64>,
        half: bool,
    },
    Remove {
        target: usize,
    },
    Key {
        target: usize,
        increase: bool,
        large: bool,
    },
    Drag {
        target: usize,
        moves: Vec<f64>,
        cancel: bool,
    },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), any::<bool>(), prop::option::of(0.0f64..200.0), any::<bool>()).prop_map(
            |(target, before, fixed, half)| Op::Add {
                target,
                before,
                fixed,
                half,
            }
        ),
        any::<usize>().prop_map(|target| Op::Remove { target }),
        (any::<usize>(), any::<bool>(), any::<bool>()).prop_map(|(target, increase, large)| {
            Op::Key {
                target,
                increase,
                large,
            }
        }),
        (
            any::<usize>(),
            prop::collection::vec(-300.0f64..300.0, 0..6),
            any::<bool>()
        )
            .prop_map(|(target, moves, cancel)| Op::Drag {
                target,
                moves,
                cancel,
            }),
    ]
}

fn seed_model() -> LayoutGroup {
    LayoutGroup::new("root", Direction::Columns)
        .with_item(LayoutLeaf::new("l0", Size::px(120.0)))
        .with_item(
            LayoutGroup::new("g0", Direction::Rows)
                .with_item(LayoutLeaf::new("l1", Size::fr(1.0)))
                .with_item(LayoutLeaf::new("l2", Size::px(60.0)))
                .with_item(
                    LayoutGroup::new("g1", Direction::Columns)
                        .with_size(Size::px(150.0))
                        .with_item(LayoutLeaf::new("l3", Size::fr(2.0)))
                        .with_item(LayoutLeaf::new("l4", Size::px(40.0))),
                ),
        )
        .with_item(LayoutLeaf::new("l5", Size::fr(1.0)))
}

fn non_root_ids(index: &LayoutIndex) -> Vec<ItemId> {
    let mut ids = index.subtree_ids(index.root().as_str());
    ids.remove(0);
    ids
}

fn pick(ids: &[ItemId], target: usize) -> Option<&ItemId> {
    (!ids.is_empty()).then(|| &ids[target % ids.len()])
}

fn run(ops: &[Op]) -> Result<(), TestCaseError> {
    let host = MemoryHost::with_sizes(&[("root", 1280.0), ("g0", 720.0), ("g1", 150.0)]);
    let mut engine = SplitterEngine::with_model(host, SplitterConfig::default(), &seed_model())
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    let mut fresh = 0usize;

    for op in ops {
        let Some(index) = engine.index() else {
            return Err(TestCaseError::fail("engine lost its layout"));
        };
        let ids = non_root_ids(index);
        match op {
            Op::Add {
                target,
                before,
                fixed,
                half,
            } => {
                let Some(sibling) = pick(&ids, *target).cloned() else {
                    continue;
                };
                let Some(parent) = index.parent(sibling.as_str()).cloned() else {
                    continue;
                };
                fresh += 1;
                let size = fixed.map_or(Size::fr(1.0), Size::px);
                let placement = if *before { Placement::Before } else { Placement::After };
                let root_before = index.root_fixed_sizes_sum();
                let outcome = engine
                    .add_sibling_leaf(
                        parent.as_str(),
                        sibling.as_str(),
                        placement,
                        LayoutLeaf::new(format!("n{fresh}"), size),
                        *half,
                    )
                    .map_err(|err| TestCaseError::fail(err.to_string()))?;
                let root_after = engine.index().map_or(0.0, LayoutIndex::root_fixed_sizes_sum);
                prop_assert!(
                    (root_after - root_before - outcome.fixed_sizes_sum_increment).abs() < 1e-6
                );
            }
            Op::Remove { target } => {
                let Some(id) = pick(&ids, *target).cloned() else {
                    continue;
                };
                let root_before = index.root_fixed_sizes_sum();
                let outcome = engine
                    .remove_item(id.as_str())
                    .map_err(|err| TestCaseError::fail(err.to_string()))?;
                let root_after = engine.index().map_or(0.0, LayoutIndex::root_fixed_sizes_sum);
                prop_assert!(
                    (root_before - root_after - outcome.fixed_sizes_sum_decrement.amount()).abs()
                        < 1e-6
                );
                prop_assert!(outcome.removed.contains(&id));
            }
            Op::Key {
                target,
                increase,
                large,
            } => {
                let Some(bar) = pick(&ids, *target).cloned() else {
                    continue;
                };
                let direction = if *increase {
                    ResizeDirection::Increase
                } else {
                    ResizeDirection::Decrease
                };
                let _ = engine.keyboard_resize(bar.as_str(), direction, *large);
            }
            Op::Drag {
                target,
                moves,
                cancel,
            } => {
                let Some(bar) = pick(&ids, *target).cloned() else {
                    continue;
                };
                let mut x = 500.0;
                let _ = engine.begin_pointer_resize(bar.as_str(), PointerPosition::new(x, x));
                for delta in moves {
                    x += delta;
                    let _ = engine.pointer_move(PointerPosition::new(x, x));
                    if let Some(frame) = engine.host_mut().take_frame() {
                        let _ = engine.on_frame(frame);
                    }
                }
                if *cancel {
                    let _ = engine.disconnect();
                } else {
                    let _ = engine.pointer_up(PointerPosition::new(x, x));
                }
            }
        }

        let Some(index) = engine.index() else {
            return Err(TestCaseError::fail("engine lost its layout"));
        };
        prop_assert!(index.check_invariants().is_ok(), "{:?}", index.check_invariants());
        for id in non_root_ids(index) {
            let size = index.actual_size(id.as_str()).unwrap_or_default();
            prop_assert!(size.is_valid(), "{id} has invalid size {size}");
        }
        let rendered: Vec<(ItemId, Option<String>)> = index
            .groups_preorder()
            .into_iter()
            .map(|group| {
                let template = engine.grid_template(group.as_str());
                (group, template)
            })
            .collect();
        for (group, template) in rendered {
            prop_assert_eq!(engine.host().track(group.as_str()), template.as_deref());
        }
        prop_assert!(!engine.host().listeners.attached);
        prop_assert!(engine.host().frames.pending.is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn random_streams_preserve_index_invariants(ops in prop::collection::vec(op_strategy(), 1..40)) {
        run(&ops)?;
    }
}

#[test]
fn drag_stream_conserves_flexible_budget() {
    let model = LayoutGroup::new("root", Direction::Columns).with_items(
        (0..5).map(|i| LayoutLeaf::new(format!("p{i}"), Size::fr(1.0 + f64::from(i)))),
    );
    let mut engine = SplitterEngine::with_model(
        MemoryHost::with_sizes(&[("root", 1016.0)]),
        SplitterConfig::default(),
        &model,
    )
    .expect("valid model");
    let total = engine.index().and_then(|index| index.total_flex("root"));
    for (bar, delta) in [("p0", 90.0), ("p1", -400.0), ("p3", 1200.0), ("p2", 13.5)] {
        let _ = engine.begin_pointer_resize(bar, PointerPosition::new(0.0, 0.0));
        let _ = engine.pointer_move(PointerPosition::new(delta, 0.0));
        if let Some(frame) = engine.host_mut().take_frame() {
            let _ = engine.on_frame(frame);
        }
        let _ = engine.pointer_up(PointerPosition::new(delta, 0.0));
        let now = engine.index().and_then(|index| index.total_flex("root"));
        let (Some(total), Some(now)) = (total, now) else {
            panic!("root lost its children");
        };
        assert!((total - now).abs() < 1e-9, "flex budget drifted: {total} -> {now}");
    }
}

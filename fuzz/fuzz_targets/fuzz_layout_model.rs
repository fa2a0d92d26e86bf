#![no_main]

use gridsplit_layout::{GridTemplateOptions, LayoutGroup, LayoutIndex, Size};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap length to keep fuzzing fast.
    if data.len() > 4096 {
        return;
    }
    if let Ok(text) = std::str::from_utf8(data) {
        // Size parsing must never panic, and accepted sizes must be usable.
        if let Ok(size) = Size::parse(text) {
            assert!(size.is_valid(), "parsed invalid size {size} from {text:?}");
        }
    }

    let Ok(model) = serde_json::from_slice::<LayoutGroup>(data) else {
        return;
    };
    let Ok(index) = LayoutIndex::build(&model) else {
        return;
    };

    // A freshly built index is consistent and exports what it was built from.
    index
        .check_invariants()
        .expect("fresh index violates its invariants");
    assert_eq!(index.to_model(), model, "export differs from input");

    for group in index.groups_preorder() {
        let template = index
            .grid_template(group.as_str(), GridTemplateOptions::default())
            .expect("every group renders");
        let children = index.children(group.as_str()).map_or(0, <[_]>::len);
        let tracks = template.split_whitespace().count();
        assert_eq!(tracks, (2 * children).saturating_sub(1), "{group}: {template}");
    }
});

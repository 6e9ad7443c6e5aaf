//! Property tests for invariants that must hold on arbitrary input.

use proptest::prelude::*;
use proptest::sample::{Index, select};

use tagwise::tracker::{Editor, MemoryEditor};
use tagwise::{
    MarkupContextOptions, TrackingController, get_css_context, get_css_section, get_html_context,
    select_item_css, select_item_html,
};

fn markup_and_pos() -> impl Strategy<Value = (String, usize)> {
    "[<>/a-z =\"'{}.#]{0,48}".prop_flat_map(|code| {
        let len = code.len();
        (Just(code), 0..=len)
    })
}

fn stylesheet_and_pos() -> impl Strategy<Value = (String, usize)> {
    "[a-z :;{}@#()\"\n-]{0,48}".prop_flat_map(|code| {
        let len = code.len();
        (Just(code), 0..=len)
    })
}

#[derive(Clone, Debug)]
enum Step {
    Type(char),
    Backspace,
    Caret(Index),
}

fn steps() -> impl Strategy<Value = Vec<Step>> {
    let step = prop_oneof![
        4 => select(vec!['u', 'l', 'p', '>', '.', '[', ']', ' ', '*', '2', '+']).prop_map(Step::Type),
        1 => Just(Step::Backspace),
        1 => any::<Index>().prop_map(Step::Caret),
    ];
    prop::collection::vec(step, 0..40)
}

proptest! {
    #[test]
    fn select_models_have_no_empty_or_repeated_ranges(
        (code, pos) in markup_and_pos(),
        previous in any::<bool>(),
    ) {
        if let Some(model) = select_item_html(&code, pos, previous) {
            prop_assert!(model.ranges.iter().all(|r| r.start < r.end));
            prop_assert!(model.ranges.windows(2).all(|w| w[0] != w[1]));
        }
    }

    #[test]
    fn stylesheet_select_models_have_no_empty_or_repeated_ranges(
        (code, pos) in stylesheet_and_pos(),
        previous in any::<bool>(),
    ) {
        if let Some(model) = select_item_css(&code, pos, previous) {
            prop_assert!(model.ranges.iter().all(|r| r.start < r.end));
            prop_assert!(model.ranges.windows(2).all(|w| w[0] != w[1]));
        }
    }

    #[test]
    fn sections_contain_their_body_and_position((code, pos) in stylesheet_and_pos()) {
        if let Some(section) = get_css_section(&code, pos, true) {
            prop_assert!(section.start <= section.body_start);
            prop_assert!(section.body_start <= section.body_end);
            prop_assert!(section.body_end <= section.end);
            prop_assert!(section.start <= pos && pos <= section.end);
        }
    }

    #[test]
    fn context_resolution_is_idempotent((code, pos) in markup_and_pos()) {
        let options = MarkupContextOptions::default();
        prop_assert_eq!(get_html_context(&code, pos, &options), get_html_context(&code, pos, &options));
        prop_assert_eq!(get_css_context(&code, pos), get_css_context(&code, pos));
    }

    #[test]
    fn tracker_keeps_last_position_in_range(initial in "[a-z <>]{0,12}", steps in steps()) {
        let controller = TrackingController::default();
        let mut editor = MemoryEditor::new(1, "html", initial);
        controller.handle_selection_change(&mut editor);

        for step in steps {
            let returned = match step {
                Step::Type(ch) => {
                    editor.type_text(&ch.to_string());
                    controller.handle_change(&mut editor)
                }
                Step::Backspace => {
                    editor.backspace();
                    controller.handle_change(&mut editor)
                }
                Step::Caret(index) => {
                    let len = editor.document_length();
                    editor.set_caret(index.index(len + 1));
                    controller.handle_selection_change(&mut editor)
                }
            };

            if let Some(active) = controller.tracker(editor.id()) {
                prop_assert!(active.range.start <= active.range.end);
                prop_assert!(active.range.contains(active.last_position));
                prop_assert_eq!(Some(&active), returned.as_ref());
            }
        }
    }
}

use concierge_core::config::DialogueConfig;
use concierge_dialogue::{spoken_text, Presenter};
use proptest::prelude::*;

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-z]{1,12}", prop::sample::select(vec!["", "", "", ".", "?", ","])), 0..60)
        .prop_map(|words| {
            words
                .into_iter()
                .map(|(word, punct)| format!("{word}{punct}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
}

proptest! {
    #[test]
    fn chunks_respect_the_limit_and_keep_every_word(text in arb_text(), limit in 16usize..120) {
        let presenter = Presenter::new(DialogueConfig { chunk_chars: limit, ..DialogueConfig::default() });
        let chunks = presenter.chunk(&text);

        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.index, i);
            prop_assert!(chunk.text.chars().count() <= limit);
            prop_assert!(!chunk.text.is_empty());
            prop_assert_eq!(chunk.is_final, i + 1 == chunks.len());
        }

        let original: Vec<&str> = text.split_whitespace().collect();
        let spoken = spoken_text(&chunks);
        let rejoined: Vec<&str> = spoken.split_whitespace().collect();
        prop_assert_eq!(rejoined, original);
    }
}

#[test]
fn short_text_is_a_single_final_chunk() {
    let chunks = Presenter::default().chunk("Okay.");
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].is_final);
    assert_eq!(chunks[0].index, 0);
}

#[test]
fn empty_text_has_no_chunks() {
    assert!(Presenter::default().chunk("   ").is_empty());
}

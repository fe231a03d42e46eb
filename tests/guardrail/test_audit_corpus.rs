//! Fixed corpora of student messages and coach replies

use mathcoach::{Category, MessageClassifier, ResponseScanner, TemplateBank};

const STUDENT_CORPUS: &[(&str, Category)] = &[
    ("What's the final answer?", Category::AnswerSeeking),
    ("Just give me the solution please", Category::AnswerSeeking),
    ("Can you solve this for me", Category::AnswerSeeking),
    ("What is the value of x", Category::AnswerSeeking),
    ("which option should I pick", Category::AnswerSeeking),
    ("I'm stuck, just tell me the answer", Category::AnswerSeeking),
    ("is 42 correct?", Category::ConfirmationSeeking),
    ("Am I right?", Category::ConfirmationSeeking),
    ("can you check my answer", Category::ConfirmationSeeking),
    ("Did I get it correct", Category::ConfirmationSeeking),
    ("I got 42, is that correct?", Category::ConfirmationSeeking),
    ("is that right?", Category::ConfirmationSeeking),
    ("so it must be 5050", Category::NearFinal),
    ("that means x = 3", Category::NearFinal),
    ("therefore the total equals 20", Category::NearFinal),
    ("I'm stuck", Category::Stuck),
    ("I don't get it", Category::Stuck),
    ("please help me", Category::Stuck),
    ("I can't figure this out", Category::Stuck),
    ("I think we add the pairs first", Category::None),
    ("", Category::None),
];

const LEAKING_REPLIES: &[&str] = &[
    "The answer is 17.",
    "Great job, the final answer is 5050",
    "So the total = 42",
    "Yes, that's correct!",
    "You got it!",
    "Option B is correct.",
    "Subtract 7 from both sides.\nx = 7.",
    "The value is 12 once you simplify.",
    "12 is right, nice work",
    "Nice thinking!\nThat is correct\nWhat's next?",
];

const SAFE_REPLIES: &[&str] = &[
    "What do you notice about the first and last numbers?",
    "Try a smaller version of the problem. What happens with 1 to 10?",
    "How could you check your result using a different method?",
    "What stays the same when you pair the numbers up?",
];

#[test]
fn test_student_corpus_classification() {
    let classifier = MessageClassifier::default();
    for (text, expected) in STUDENT_CORPUS {
        assert_eq!(classifier.classify(text), *expected, "classifying {text:?}");
    }
}

#[test]
fn test_classification_is_idempotent() {
    let classifier = MessageClassifier::default();
    for (text, _) in STUDENT_CORPUS {
        let first = classifier.classify_detailed(text);
        for _ in 0..3 {
            assert_eq!(classifier.classify_detailed(text), first);
        }
    }
}

#[test]
fn test_leaking_replies_are_flagged() {
    let scanner = ResponseScanner::default();
    for reply in LEAKING_REPLIES {
        assert!(scanner.scan_for_leak(reply), "missed leak in {reply:?}");
    }
}

#[test]
fn test_safe_replies_pass() {
    let scanner = ResponseScanner::default();
    for reply in SAFE_REPLIES {
        assert!(scanner.scan(reply).is_none(), "false positive on {reply:?}");
    }
}

#[test]
fn test_substituted_text_never_leaks() {
    let scanner = ResponseScanner::default();
    let bank = TemplateBank::seeded(3);
    for _ in 0..25 {
        assert!(!scanner.scan_for_leak(&bank.leak_replacement()));
        assert!(!scanner.scan_for_leak(&bank.answer_redirect()));
        assert!(!scanner.scan_for_leak(&bank.persistence()));
    }
    assert!(!scanner.scan_for_leak(bank.confirmation_request()));
    assert!(!scanner.scan_for_leak(bank.near_final()));
}

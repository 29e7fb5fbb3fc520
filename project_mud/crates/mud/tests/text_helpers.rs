use mud::text::{dollar_int, listify, title_case};

#[test]
fn listify_examples() {
    assert_eq!(listify::<&str>(&[]), "");
    assert_eq!(listify(&["a"]), "a");
    assert_eq!(listify(&["a", "b"]), "a and b");
    assert_eq!(listify(&["apples", "bananas", "oranges"]), "apples, bananas, and oranges");
}

#[test]
fn dollar_int_examples() {
    assert_eq!(dollar_int(0), "$0.00");
    assert_eq!(dollar_int(100), "$1.00");
    assert_eq!(dollar_int(123_456_789), "$1,234,567.89");
    assert_eq!(dollar_int(-500_000), "-$5,000.00");
}

#[test]
fn title_case_keeps_leading_article() {
    assert_eq!(title_case("the eye of THE storm"), "The Eye Of the Storm");
}

use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let hx_endpoint = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        hx_endpoint, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {hx_endpoint:?}"
    );
}

/// Find the required input called `name` and check its type.
#[track_caller]
fn must_get_required_input<'a>(form: &ElementRef<'a>, name: &str, type_: &str) -> ElementRef<'a> {
    let input = form
        .select(&Selector::parse("input").unwrap())
        .find(|input| input.value().attr("name") == Some(name))
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""));

    let input_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(
        input_type, type_,
        "want input {name} with type \"{type_}\", got {input_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input with name {name} to have the required attribute but got none"
    );

    input
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    must_get_required_input(form, name, type_);
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = must_get_required_input(form, name, type_);
    let input_value = input.value().attr("value").unwrap_or_default();

    assert_eq!(
        input_value, value,
        "want input {name} with value \"{value}\", got {input_value:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("No button found");

    assert_eq!(
        submit_button.value().attr("type").unwrap_or_default(),
        "submit",
        "want submit button with type=\"submit\""
    );
}

/// Check the text of the first paragraph in the form, where form errors are shown.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let error_message = form
        .select(&Selector::parse("p").unwrap())
        .next()
        .expect("No error message found")
        .text()
        .collect::<String>();

    assert_eq!(want_error_message, error_message.trim());
}

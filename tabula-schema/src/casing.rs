//! Bidirectional mapping between external (camel) and storage (snake)
//! identifiers.
//!
//! Model documents name fields in mixed case (`createdAt`); columns and
//! tables use snake case (`created_at`). A digit run is treated as one
//! unit: `hello123` becomes `hello_123`, not `hello_1_2_3`.
//!
//! `to_external(to_storage(x)) == x` holds for identifiers made of letters
//! and digit runs that are already in valid camel form. It is not
//! round-trip safe for inputs with leading separators or consecutive
//! uppercase runs (acronyms like `userID`); callers should avoid those in
//! model names.

/// Convert an external (camel) identifier to its storage (snake) form.
pub fn to_storage(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut in_digit_run = false;
    for (i, c) in name.chars().enumerate() {
        let is_digit = c.is_ascii_digit();
        if i > 0 {
            if c.is_ascii_uppercase() {
                out.push('_');
            } else if is_digit && !in_digit_run {
                out.push('_');
            }
        }
        in_digit_run = is_digit;
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Convert a storage (snake) identifier back to its external (camel) form.
///
/// A separator upper-cases the following lowercase letter and is consumed;
/// digits after a separator pass through unchanged (`hello_123` →
/// `hello123`). An already-uppercase first letter is left alone.
pub fn to_external(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            upper_next = false;
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

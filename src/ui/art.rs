//! ASCII envelope frames for the terminal surface.

pub fn envelope_closed() -> &'static str {
    r#" ┌───────────────────────────────┐
 │ \                           / │
 │   \                       /   │
 │     \                   /     │
 │       \               /       │
 │         \    ___    /         │
 │           \ ( ♥ ) /           │
 │             `───´             │
 │                               │
 │                               │
 └───────────────────────────────┘"#
}

pub fn envelope_open() -> &'static str {
    r#"           _____________
         /               \
       /    ___________    \
     /     |  ~ ♥ ~    |     \
   /       |___________|       \
 ┌───────────────────────────────┐
 │ .                           . │
 │   ` .                   . `   │
 │       ` .           . `       │
 │           ` . _ . `           │
 └───────────────────────────────┘"#
}

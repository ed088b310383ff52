/// Bootstrap DDL. Only creates what is missing; never alters existing tables.
pub const POSTGRES_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS inventory (
    id SERIAL PRIMARY KEY,
    productname TEXT NOT NULL,
    amount INTEGER NOT NULL,
    userid INTEGER NOT NULL REFERENCES users(id)
);
"#;

/// Split the bundled DDL into individual statements; prepared statements
/// accept one command each.
pub fn statements() -> impl Iterator<Item = &'static str> {
    POSTGRES_INIT
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

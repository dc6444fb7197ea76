//! SQL text helpers shared by dialect implementations.

/// Placeholder and identifier-quoting conventions of a target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlFlavor {
    /// Backtick identifiers, positional `?` placeholders.
    MySql,
    /// Double-quoted identifiers, positional `?` placeholders.
    Ansi,
    /// Double-quoted identifiers, numbered `$n` placeholders.
    Postgres,
}

impl SqlFlavor {
    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::MySql | Self::Ansi => "?".to_string(),
            Self::Postgres => format!("${index}"),
        }
    }

    /// Quote an identifier, doubling any embedded quote character.
    pub fn quote(&self, name: &str) -> String {
        match self {
            Self::MySql => format!("`{}`", name.replace('`', "``")),
            Self::Ansi | Self::Postgres => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }
}

impl Default for SqlFlavor {
    fn default() -> Self {
        Self::MySql
    }
}

/// Join `n` placeholders starting at 1-based parameter `offset + 1`.
pub fn placeholder_list(flavor: SqlFlavor, offset: usize, n: usize) -> String {
    (0..n)
        .map(|i| flavor.placeholder(offset + i + 1))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(SqlFlavor::MySql.placeholder(1), "?");
        assert_eq!(SqlFlavor::MySql.placeholder(5), "?");
        assert_eq!(SqlFlavor::Postgres.placeholder(3), "$3");
    }

    #[test]
    fn test_quote() {
        assert_eq!(SqlFlavor::MySql.quote("user"), "`user`");
        assert_eq!(SqlFlavor::Postgres.quote("user"), "\"user\"");
        assert_eq!(SqlFlavor::MySql.quote("weird`name"), "`weird``name`");
    }

    #[test]
    fn test_placeholder_list() {
        assert_eq!(placeholder_list(SqlFlavor::MySql, 0, 3), "?, ?, ?");
        assert_eq!(placeholder_list(SqlFlavor::Postgres, 2, 2), "$3, $4");
    }
}

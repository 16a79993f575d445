/// Character cursor over a source string with line tracking.
pub(crate) struct CharReader<'a> {
    chars: std::str::Chars<'a>,
    line: usize,
}

impl<'a> CharReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars(),
            line: 1,
        }
    }

    pub fn get(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// The character after the next one, for two-character decisions such as
    /// `3.5` vs `3.` at end of clause.
    pub fn peek2(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next()
    }

    /// Cloned lookahead cursor, for decisions needing more than two
    /// characters (float exponents).
    pub fn clone_probe(&self) -> std::str::Chars<'a> {
        self.chars.clone()
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct TokenStream<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> TokenStream<'a> {
    pub fn next(&mut self) -> Option<&'a str> {
        (self.pos < self.tokens.len()).then(|| {
            self.pos += 1;
            self.tokens[self.pos - 1]
        })
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    /// the tokens not consumed yet
    pub fn rest(&self) -> &[&'a str] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }
}

impl<'a> FromIterator<&'a str> for TokenStream<'a> {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
            pos: 0,
        }
    }
}

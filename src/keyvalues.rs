//! Minimal reader for the KeyValues text trailing the solids in a phy file.
//!
//! Only what the ragdoll description needs: top level `name { key value … }` sections
//! with quoted or bare tokens, comments, and nested blocks (skipped).

/// A flat `name { key value … }` section.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Section {
    pub name: String,
    pairs: Vec<(String, String)>,
}

impl Section {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.get(key)?.trim().parse().ok()
    }

    pub fn get_i32(&self, key: &str) -> Option<i32> {
        self.get(key)?.trim().parse().ok()
    }
}

pub(crate) fn sections(text: &str) -> Vec<Section> {
    let mut tokens = Tokenizer {
        data: text.as_bytes(),
        offset: 0,
    };
    let mut sections = Vec::new();

    while let Some(token) = tokens.next() {
        let Token::Text(name) = token else {
            // stray brace at the top level, not a section we can use
            continue;
        };
        if tokens.next() != Some(Token::Open) {
            continue;
        }
        let mut pairs = Vec::new();
        loop {
            match tokens.next() {
                Some(Token::Text(key)) => match tokens.next() {
                    Some(Token::Text(value)) => pairs.push((key, value)),
                    // nested block as a value, not part of the ragdoll description
                    Some(Token::Open) => skip_block(&mut tokens),
                    _ => break,
                },
                Some(Token::Open) => skip_block(&mut tokens),
                _ => break,
            }
        }
        sections.push(Section { name, pairs });
    }
    sections
}

fn skip_block(tokens: &mut Tokenizer) {
    let mut depth = 1usize;
    for token in tokens {
        match token {
            Token::Open => depth += 1,
            Token::Close => {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
            Token::Text(_) => {}
        }
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Text(String),
}

struct Tokenizer<'a> {
    data: &'a [u8],
    offset: usize,
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            match *self.data.get(self.offset)? {
                byte if byte.is_ascii_whitespace() => self.offset += 1,
                b'/' if self.data.get(self.offset + 1) == Some(&b'/') => {
                    while !matches!(self.data.get(self.offset), None | Some(&b'\n')) {
                        self.offset += 1;
                    }
                }
                b'{' => {
                    self.offset += 1;
                    return Some(Token::Open);
                }
                b'}' => {
                    self.offset += 1;
                    return Some(Token::Close);
                }
                b'"' => {
                    let start = self.offset + 1;
                    let mut end = start;
                    while !matches!(self.data.get(end), None | Some(&b'"')) {
                        end += 1;
                    }
                    self.offset = (end + 1).min(self.data.len());
                    return Some(Token::Text(
                        String::from_utf8_lossy(&self.data[start..end]).into_owned(),
                    ));
                }
                _ => {
                    let start = self.offset;
                    let mut end = start;
                    while self
                        .data
                        .get(end)
                        .is_some_and(|byte| !byte.is_ascii_whitespace() && !b"{}\"".contains(byte))
                    {
                        end += 1;
                    }
                    self.offset = end;
                    return Some(Token::Text(
                        String::from_utf8_lossy(&self.data[start..end]).into_owned(),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_and_bare_tokens() {
        let parsed = sections(r#"solid { "index" "0" name "phys_head" mass 5.5 }"#);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "solid");
        assert_eq!(parsed[0].get_i32("index"), Some(0));
        assert_eq!(parsed[0].get("name"), Some("phys_head"));
        assert_eq!(parsed[0].get_f32("mass"), Some(5.5));
    }

    #[test]
    fn multiple_sections_and_comments() {
        let parsed = sections(
            "// ragdoll\nsolid { index 0 }\nsolid { index 1 }\nragdollconstraint { parent 0 child 1 }",
        );
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].name, "ragdollconstraint");
        assert_eq!(parsed[2].get_i32("child"), Some(1));
    }

    #[test]
    fn nested_blocks_are_skipped() {
        let parsed = sections("editparams { rootname x inner { a b } totalmass 10 } solid { index 0 }");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].get_f32("totalmass"), Some(10.0));
        assert_eq!(parsed[1].name, "solid");
    }

    #[test]
    fn keys_are_case_insensitive() {
        let parsed = sections("solid { Index 3 }");
        assert_eq!(parsed[0].get_i32("index"), Some(3));
    }
}

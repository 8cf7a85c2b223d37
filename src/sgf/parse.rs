//! Main-line reader for SGF game records.
//!
//! Only the first variation is kept; sibling variations are skipped without
//! being decoded.

use crate::error::SgfError;

/// One SGF node: its properties in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub props: Vec<(String, Vec<String>)>,
}

impl Node {
    /// First value of `ident`, if present.
    pub fn get(&self, ident: &str) -> Option<&str> {
        self.values(ident).first().map(String::as_str)
    }

    /// All values of `ident` (empty slice if absent).
    pub fn values(&self, ident: &str) -> &[String] {
        self.props
            .iter()
            .find(|(id, _)| id == ident)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Parse the main line (root node first) of the first game tree in `text`.
pub fn main_line(text: &str) -> Result<Vec<Node>, SgfError> {
    let start = text.find('(').ok_or(SgfError::MissingRoot)?;
    let mut parser = Parser { src: text, pos: start + 1 };
    parser.skip_ws();
    if parser.peek() != Some(';') {
        return Err(SgfError::MissingRoot);
    }
    let mut nodes = Vec::new();
    parser.tree(&mut nodes)?;
    Ok(nodes)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Body of a game tree, positioned just after its `(`.
    fn tree(&mut self, nodes: &mut Vec<Node>) -> Result<(), SgfError> {
        let mut descended = false;
        loop {
            self.skip_ws();
            match self.peek() {
                Some(';') if !descended => nodes.push(self.node()?),
                Some('(') => {
                    self.bump();
                    if descended {
                        self.skip_tree()?;
                    } else {
                        descended = true;
                        self.tree(nodes)?;
                    }
                }
                Some(')') => {
                    self.bump();
                    return Ok(());
                }
                // Records cut off mid-tree still yield the moves read so far.
                None => return Ok(()),
                Some(ch) => return Err(SgfError::Unexpected { ch, offset: self.pos }),
            }
        }
    }

    fn node(&mut self) -> Result<Node, SgfError> {
        self.bump();
        let mut node = Node::default();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(c) if c.is_ascii_alphabetic() => {
                    let ident_start = self.pos;
                    while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
                        self.bump();
                    }
                    // FF[3] allowed lowercase letters inside identifiers; drop them.
                    let ident: String = self.src[ident_start..self.pos]
                        .chars()
                        .filter(char::is_ascii_uppercase)
                        .collect();

                    let mut values = Vec::new();
                    self.skip_ws();
                    while self.peek() == Some('[') {
                        values.push(self.value()?);
                        self.skip_ws();
                    }
                    if values.is_empty() {
                        let ch = self.peek().unwrap_or(')');
                        return Err(SgfError::Unexpected { ch, offset: self.pos });
                    }
                    node.props.push((ident, values));
                }
                _ => return Ok(node),
            }
        }
    }

    fn value(&mut self) -> Result<String, SgfError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    // Soft line break.
                    Some('\n') => {}
                    Some(c) => out.push(c),
                    None => return Err(SgfError::UnterminatedValue(start)),
                },
                Some(']') => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(SgfError::UnterminatedValue(start)),
            }
        }
    }

    /// Skip a sibling variation, positioned just after its `(`.
    fn skip_tree(&mut self) -> Result<(), SgfError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                Some('[') => {
                    self.value()?;
                }
                Some('(') => {
                    self.bump();
                    depth += 1;
                }
                Some(')') => {
                    self.bump();
                    depth -= 1;
                }
                Some(_) => {
                    self.bump();
                }
                None => return Ok(()),
            }
        }
        Ok(())
    }
}

use super::error::SelectionError;
use super::selector::{ScriptLanguage, StaticSelector};
use crate::core::models::atom::Atom;
use crate::core::models::structure::Model;

/// A compiled selection script.
///
/// Only a PyMOL subset is understood: the class keywords (`all`, `none`,
/// `polymer`, `protein`, `nucleic`, `ligand`/`organic`, `water`/`solvent`,
/// `ion`/`inorganic`), the property keywords `chain`, `resi`, `resn`, `name` and
/// `elem` with `+`-joined values, the boolean operators `and`/`&`, `or`/`|`,
/// `not`/`!`, and parentheses. `not` binds tighter than `and`, which binds
/// tighter than `or`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptQuery {
    All,
    Nothing,
    Class(StaticSelector),
    Chain(Vec<String>),
    Resi(Vec<(i64, i64)>),
    Resn(Vec<String>),
    Name(Vec<String>),
    Elem(Vec<String>),
    Not(Box<ScriptQuery>),
    And(Box<ScriptQuery>, Box<ScriptQuery>),
    Or(Box<ScriptQuery>, Box<ScriptQuery>),
}

impl ScriptQuery {
    pub fn compile(language: ScriptLanguage, text: &str) -> Result<Self, SelectionError> {
        if language != ScriptLanguage::Pymol {
            return Err(SelectionError::UnsupportedLanguage(language.to_string()));
        }
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(syntax(0, "empty selection"));
        }
        let mut parser = Parser { tokens, pos: 0 };
        let query = parser.or_expr()?;
        if let Some(token) = parser.peek() {
            return Err(syntax(parser.pos, format!("unexpected '{}'", token.text())));
        }
        Ok(query)
    }

    pub fn matches(&self, model: &Model, atom: &Atom) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::Class(class) => class.matches(model, atom),
            Self::Chain(chains) => chains.iter().any(|c| *c == atom.auth_asym_id),
            Self::Resi(ranges) => atom
                .auth_seq_id
                .is_some_and(|seq| ranges.iter().any(|(lo, hi)| (*lo..=*hi).contains(&seq))),
            Self::Resn(names) => names
                .iter()
                .any(|n| n.eq_ignore_ascii_case(&atom.label_comp_id)),
            Self::Name(names) => names
                .iter()
                .any(|n| n.eq_ignore_ascii_case(&atom.auth_atom_id)),
            Self::Elem(symbols) => symbols
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&atom.type_symbol)),
            Self::Not(inner) => !inner.matches(model, atom),
            Self::And(a, b) => a.matches(model, atom) && b.matches(model, atom),
            Self::Or(a, b) => a.matches(model, atom) || b.matches(model, atom),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    Not,
    Word(String),
}

impl Token {
    fn text(&self) -> &str {
        match self {
            Self::Open => "(",
            Self::Close => ")",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Word(word) => word,
        }
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if word.is_empty() {
            return;
        }
        let token = match word.to_ascii_lowercase().as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            _ => Token::Word(word.clone()),
        };
        tokens.push(token);
        word.clear();
    };

    for c in text.chars() {
        let punct = match c {
            '(' => Some(Token::Open),
            ')' => Some(Token::Close),
            '&' => Some(Token::And),
            '|' => Some(Token::Or),
            '!' => Some(Token::Not),
            _ => None,
        };
        if let Some(token) = punct {
            flush(&mut word, &mut tokens);
            tokens.push(token);
        } else if c.is_whitespace() {
            flush(&mut word, &mut tokens);
        } else {
            word.push(c);
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

fn syntax(position: usize, message: impl Into<String>) -> SelectionError {
    SelectionError::Syntax {
        position,
        message: message.into(),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn or_expr(&mut self) -> Result<ScriptQuery, SelectionError> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and_expr()?;
            left = ScriptQuery::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<ScriptQuery, SelectionError> {
        let mut left = self.not_expr()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.not_expr()?;
            left = ScriptQuery::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<ScriptQuery, SelectionError> {
        // Iterative so long `not not not ...` chains stay flat on the stack.
        let mut negations = 0usize;
        while self.peek() == Some(&Token::Not) {
            self.pos += 1;
            negations += 1;
        }
        let mut query = self.primary()?;
        for _ in 0..negations {
            query = ScriptQuery::Not(Box::new(query));
        }
        Ok(query)
    }

    fn primary(&mut self) -> Result<ScriptQuery, SelectionError> {
        let position = self.pos;
        match self.next() {
            Some(Token::Open) => {
                let inner = self.or_expr()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(syntax(self.pos, "expected ')'")),
                }
            }
            Some(Token::Word(word)) => self.keyword(position, &word.to_ascii_lowercase()),
            Some(other) => Err(syntax(position, format!("unexpected '{}'", other.text()))),
            None => Err(syntax(position, "unexpected end of selection")),
        }
    }

    fn keyword(&mut self, position: usize, keyword: &str) -> Result<ScriptQuery, SelectionError> {
        let query = match keyword {
            "all" | "*" => ScriptQuery::All,
            "none" => ScriptQuery::Nothing,
            "polymer" => ScriptQuery::Class(StaticSelector::Polymer),
            "protein" => ScriptQuery::Class(StaticSelector::Protein),
            "nucleic" => ScriptQuery::Class(StaticSelector::Nucleic),
            "ligand" | "organic" => ScriptQuery::Class(StaticSelector::Ligand),
            "water" | "solvent" => ScriptQuery::Class(StaticSelector::Water),
            "ion" | "inorganic" => ScriptQuery::Class(StaticSelector::Ion),
            "chain" => ScriptQuery::Chain(self.values(keyword)?),
            "resn" => ScriptQuery::Resn(self.values(keyword)?),
            "name" => ScriptQuery::Name(self.values(keyword)?),
            "elem" => ScriptQuery::Elem(self.values(keyword)?),
            "resi" => {
                let values = self.values(keyword)?;
                let ranges = values
                    .iter()
                    .map(|value| parse_range(value).ok_or_else(|| {
                        syntax(self.pos - 1, format!("invalid residue range '{value}'"))
                    }))
                    .collect::<Result<Vec<_>, _>>()?;
                ScriptQuery::Resi(ranges)
            }
            other => return Err(syntax(position, format!("unknown keyword '{other}'"))),
        };
        Ok(query)
    }

    fn values(&mut self, keyword: &str) -> Result<Vec<String>, SelectionError> {
        match self.next() {
            Some(Token::Word(word)) => Ok(word
                .split('+')
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()),
            _ => Err(syntax(self.pos, format!("'{keyword}' expects a value"))),
        }
    }
}

fn parse_range(value: &str) -> Option<(i64, i64)> {
    // A leading '-' is a sign, not a range separator.
    let split = value.get(1..)?.find('-').map(|i| i + 1);
    match split {
        Some(i) => {
            let lo = value[..i].parse().ok()?;
            let hi = value[i + 1..].parse().ok()?;
            Some((lo, hi))
        }
        None => {
            let single = value.parse().ok()?;
            Some((single, single))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::StructureData;

    fn compile(text: &str) -> ScriptQuery {
        ScriptQuery::compile(ScriptLanguage::Pymol, text).unwrap()
    }

    fn fixture() -> (StructureData, Vec<Atom>) {
        let atoms = vec![
            Atom::new(1, "N", "N", "LYS", "A", "1", Some(10)),
            Atom::new(2, "C", "CA", "LYS", "A", "1", Some(10)),
            Atom::new(3, "C", "CA", "GLY", "B", "1", Some(25)),
            Atom::new(4, "O", "O", "HOH", "W", "3", None),
        ];
        let mut data = StructureData::new();
        let model = data.add_model();
        for atom in &atoms {
            data.add_atom(model, atom.clone());
        }
        (data, atoms)
    }

    fn selected(query: &ScriptQuery) -> Vec<i64> {
        let (data, atoms) = fixture();
        let (_, model) = data.models().next().unwrap();
        atoms
            .iter()
            .filter(|atom| query.matches(model, atom))
            .map(|atom| atom.id)
            .collect()
    }

    #[test]
    fn property_keywords_select_atoms() {
        assert_eq!(selected(&compile("chain A")), [1, 2]);
        assert_eq!(selected(&compile("resi 20-30")), [3]);
        assert_eq!(selected(&compile("name CA")), [2, 3]);
        assert_eq!(selected(&compile("resn lys+hoh")), [1, 2, 4]);
        assert_eq!(selected(&compile("elem o")), [4]);
    }

    #[test]
    fn operator_precedence_is_not_and_or() {
        assert_eq!(selected(&compile("chain B or chain A and name N")), [1, 3]);
        assert_eq!(selected(&compile("(chain B or chain A) and name CA")), [2, 3]);
        assert_eq!(selected(&compile("not water & !chain B")), [1, 2]);
    }

    #[test]
    fn class_keywords_reuse_static_selectors() {
        assert_eq!(selected(&compile("solvent")), [4]);
        assert_eq!(selected(&compile("protein")), [1, 2, 3]);
        assert_eq!(selected(&compile("none")), Vec::<i64>::new());
    }

    #[test]
    fn residue_ranges_accept_lists_and_negatives() {
        assert_eq!(parse_range("-5"), Some((-5, -5)));
        assert_eq!(parse_range("-5-3"), Some((-5, 3)));
        assert_eq!(parse_range("7"), Some((7, 7)));
        assert_eq!(parse_range("a-b"), None);
        assert_eq!(selected(&compile("resi 10+25")), [1, 2, 3]);
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = |text| ScriptQuery::compile(ScriptLanguage::Pymol, text).unwrap_err();
        assert!(matches!(err("chain"), SelectionError::Syntax { .. }));
        assert!(matches!(err("(chain A"), SelectionError::Syntax { .. }));
        assert!(matches!(err("chain A chain B"), SelectionError::Syntax { position: 2, .. }));
        assert!(matches!(err("within 5 of ligand"), SelectionError::Syntax { position: 0, .. }));
        assert!(matches!(err("   "), SelectionError::Syntax { .. }));
    }

    #[test]
    fn other_languages_are_unsupported() {
        let err = ScriptQuery::compile(ScriptLanguage::Vmd, "all").unwrap_err();
        assert_eq!(err, SelectionError::UnsupportedLanguage("vmd".into()));
    }
}

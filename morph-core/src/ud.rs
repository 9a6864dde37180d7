//! # Vocabulário Universal Dependencies
//!
//! Classes gramaticais (UPOS) e conjuntos de features `Categoria=Valor`
//! independentes do analisador. Todo conversor produz estes tipos.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConlluError;

/// Classe gramatical universal (coluna UPOS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UdPos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    /// Desconhecido: palavra sem análise e não numérica.
    X,
}

impl UdPos {
    pub const ALL: [UdPos; 17] = [
        UdPos::Adj,
        UdPos::Adp,
        UdPos::Adv,
        UdPos::Aux,
        UdPos::Cconj,
        UdPos::Det,
        UdPos::Intj,
        UdPos::Noun,
        UdPos::Num,
        UdPos::Part,
        UdPos::Pron,
        UdPos::Propn,
        UdPos::Punct,
        UdPos::Sconj,
        UdPos::Sym,
        UdPos::Verb,
        UdPos::X,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UdPos::Adj => "ADJ",
            UdPos::Adp => "ADP",
            UdPos::Adv => "ADV",
            UdPos::Aux => "AUX",
            UdPos::Cconj => "CCONJ",
            UdPos::Det => "DET",
            UdPos::Intj => "INTJ",
            UdPos::Noun => "NOUN",
            UdPos::Num => "NUM",
            UdPos::Part => "PART",
            UdPos::Pron => "PRON",
            UdPos::Propn => "PROPN",
            UdPos::Punct => "PUNCT",
            UdPos::Sconj => "SCONJ",
            UdPos::Sym => "SYM",
            UdPos::Verb => "VERB",
            UdPos::X => "X",
        }
    }
}

impl fmt::Display for UdPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UdPos {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UdPos::ALL
            .iter()
            .copied()
            .find(|pos| pos.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Conjunto ordenado de features morfológicas.
///
/// As chaves ficam em ordem lexicográfica do nome da categoria, então a
/// serialização é determinística. Um conjunto vazio é renderizado como `_`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features(BTreeMap<String, String>);

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere ou substitui o valor de uma categoria.
    pub fn insert(&mut self, category: impl Into<String>, value: impl Into<String>) {
        self.0.insert(category.into(), value.into());
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.0.get(category).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Lê a coluna FEATS (`Case=Nom|Number=Sing` ou `_`).
    pub fn parse(column: &str) -> Result<Self, ConlluError> {
        let mut features = Features::new();
        if column == "_" || column.is_empty() {
            return Ok(features);
        }
        for pair in column.split('|') {
            match pair.split_once('=') {
                Some((category, value)) if !category.is_empty() && !value.is_empty() => {
                    features.insert(category, value);
                }
                _ => {
                    return Err(ConlluError::Malformed {
                        line: 0,
                        reason: format!("feature inválida: {pair:?}"),
                    })
                }
            }
        }
        Ok(features)
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("_");
        }
        let pairs: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}={v}")).collect();
        f.write_str(&pairs.join("|"))
    }
}

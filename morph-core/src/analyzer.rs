//! # Analisador Morfológico Externo
//!
//! O analisador é uma caixa-preta: recebe o texto normalizado e devolve um
//! fluxo plano de registros, da esquerda para a direita, um por sequência
//! máxima de palavra ou de separador.
//!
//! ```json
//! [{"text": "Мама", "analysis": [{"lex": "мама", "gr": "S,жен,од=им,ед"}]},
//!  {"text": " "},
//!  {"text": "qwzx", "analysis": []}]
//! ```
//!
//! [`ProcessAnalyzer`] conversa com um executável externo (Mystem, ou um
//! wrapper que emita tags OpenCorpora no mesmo formato JSON).
//! [`StaticAnalyzer`] repete um fluxo fixo, útil offline e em testes.

use std::io::{self, Write};
use std::marker::PhantomData;
use std::process::{Command, Stdio};
use std::thread;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::tokenizer;

/// Uma análise candidata para uma palavra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<T> {
    #[serde(rename = "lex")]
    pub lemma: String,
    #[serde(rename = "gr")]
    pub tag: T,
}

/// Um registro do fluxo do analisador.
///
/// `analysis` ausente indica separador/pontuação; vazio indica palavra que o
/// analisador não conseguiu analisar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerRecord<T> {
    pub text: String,
    pub analysis: Option<Vec<Candidate<T>>>,
}

impl<T> AnalyzerRecord<T> {
    pub fn separator(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            analysis: None,
        }
    }

    pub fn word(text: impl Into<String>, candidates: Vec<Candidate<T>>) -> Self {
        Self {
            text: text.into(),
            analysis: Some(candidates),
        }
    }

    /// Registro que ocupa a vaga de uma palavra.
    pub fn is_alphanumeric(&self) -> bool {
        tokenizer::is_alphanumeric(&self.text)
    }

    /// Primeira análise candidata, se houver.
    pub fn first_candidate(&self) -> Option<&Candidate<T>> {
        self.analysis.as_ref().and_then(|candidates| candidates.first())
    }
}

/// Contrato do analisador: uma chamada síncrona sobre o texto inteiro.
pub trait MorphAnalyzer {
    type Tag;

    fn analyze(&self, text: &str) -> Result<Vec<AnalyzerRecord<Self::Tag>>>;
}

/// Executa um analisador externo via stdin/stdout.
///
/// A saída esperada é uma sequência de arrays JSON de registros (o Mystem com
/// `--format json` emite um array por linha); os arrays são concatenados.
#[derive(Debug, Clone)]
pub struct ProcessAnalyzer<T> {
    program: String,
    args: Vec<String>,
    _tag: PhantomData<fn() -> T>,
}

impl<T> ProcessAnalyzer<T> {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            _tag: PhantomData,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl<T: DeserializeOwned> MorphAnalyzer for ProcessAnalyzer<T> {
    type Tag = T;

    fn analyze(&self, text: &str) -> Result<Vec<AnalyzerRecord<T>>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Analyzer(format!("não foi possível iniciar {:?}: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Analyzer("stdin indisponível".to_string()))?;

        // stdin vai por outra thread; wait_with_output drena stdout e stderr juntos
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || {
                stdin.write_all(text.as_bytes())?;
                stdin.write_all(b"\n")
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("thread de escrita falhou")));
            (output, written)
        });

        let output = output?;
        if !output.status.success() {
            return Err(Error::Analyzer(format!(
                "{:?} terminou com {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        written?;

        let records = parse_record_stream(&output.stdout)?;
        debug!(program = %self.program, records = records.len(), "análise concluída");
        Ok(records)
    }
}

/// Concatena os arrays JSON emitidos pelo analisador.
pub fn parse_record_stream<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<AnalyzerRecord<T>>> {
    let mut records = Vec::new();
    for chunk in serde_json::Deserializer::from_slice(bytes).into_iter::<Vec<AnalyzerRecord<T>>>() {
        records.extend(chunk?);
    }
    Ok(records)
}

/// Repete sempre o mesmo fluxo de registros, ignorando o texto.
#[derive(Debug, Clone, Default)]
pub struct StaticAnalyzer<T> {
    records: Vec<AnalyzerRecord<T>>,
}

impl<T> StaticAnalyzer<T> {
    pub fn new(records: Vec<AnalyzerRecord<T>>) -> Self {
        Self { records }
    }
}

impl<T: Clone> MorphAnalyzer for StaticAnalyzer<T> {
    type Tag = T;

    fn analyze(&self, _text: &str) -> Result<Vec<AnalyzerRecord<T>>> {
        Ok(self.records.clone())
    }
}

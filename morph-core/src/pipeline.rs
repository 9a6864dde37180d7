//! # Pipeline de Anotação Morfológica
//!
//! Coordena, por documento: normalização → analisador → alinhamento →
//! serialização → gravação. Cada documento é anotado por inteiro antes de
//! qualquer artefato ser escrito; um documento que falha no meio não deixa
//! saída parcial e não interrompe os demais.
//!
//! Uma segunda fase opcional ([`PosFrequencyPipeline`]) relê o CONLL-U com
//! features, conta as classes gramaticais e atualiza os metadados.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use morph_core::analyzer::{AnalyzerRecord, Candidate, StaticAnalyzer};
//! use morph_core::converter::MystemTagConverter;
//! use morph_core::pipeline::{AnalyzerAnnotator, Annotator};
//!
//! let analyzer = StaticAnalyzer::new(vec![AnalyzerRecord::word(
//!     "Привет",
//!     vec![Candidate { lemma: "привет".to_string(), tag: "INTJ=".to_string() }],
//! )]);
//! let annotator = AnalyzerAnnotator::new(analyzer, MystemTagConverter::bundled().unwrap());
//!
//! let sentences = annotator.annotate("Привет!").unwrap();
//! assert_eq!(sentences[0].tokens().len(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info};

use crate::align::AlignmentEngine;
use crate::analyzer::{MorphAnalyzer, ProcessAnalyzer};
use crate::config::{AnalyzerConfig, Backend};
use crate::converter::{MystemTagConverter, OpenCorporaTag, OpenCorporaTagConverter, TagConverter};
use crate::corpus::CorpusManager;
use crate::document::{ConlluSentence, Document, DocumentId};
use crate::error::Result;
use crate::store::{ArtifactKind, DocumentStore};
use crate::tokenizer::normalize_for_analyzer;
use crate::ud::UdPos;

/// Transforma texto bruto em sentenças anotadas.
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<Vec<ConlluSentence>>;
}

/// Par analisador + conversor com o mesmo formato de tag.
pub struct AnalyzerAnnotator<A, C> {
    analyzer: A,
    engine: AlignmentEngine<C>,
}

impl<A, C> AnalyzerAnnotator<A, C>
where
    A: MorphAnalyzer,
    C: TagConverter<Tag = A::Tag>,
{
    pub fn new(analyzer: A, converter: C) -> Self {
        Self {
            analyzer,
            engine: AlignmentEngine::new(converter),
        }
    }
}

impl<A, C> Annotator for AnalyzerAnnotator<A, C>
where
    A: MorphAnalyzer + Send + Sync,
    C: TagConverter<Tag = A::Tag> + Send + Sync,
{
    fn annotate(&self, text: &str) -> Result<Vec<ConlluSentence>> {
        // Uma única chamada ao analisador por documento
        let records = self.analyzer.analyze(&normalize_for_analyzer(text))?;
        self.engine.align_document(text, &records)
    }
}

/// Monta o anotador da família configurada.
pub fn annotator_for(config: &AnalyzerConfig) -> Result<Box<dyn Annotator>> {
    let annotator: Box<dyn Annotator> = match config.backend {
        Backend::Mystem => {
            let converter = match &config.mapping {
                Some(path) => MystemTagConverter::from_path(path)?,
                None => MystemTagConverter::bundled()?,
            };
            let analyzer = ProcessAnalyzer::<String>::new(&config.command, config.args.clone());
            Box::new(AnalyzerAnnotator::new(analyzer, converter))
        }
        Backend::OpenCorpora => {
            let converter = match &config.mapping {
                Some(path) => OpenCorporaTagConverter::from_path(path)?,
                None => OpenCorporaTagConverter::bundled()?,
            };
            let analyzer = ProcessAnalyzer::<OpenCorporaTag>::new(&config.command, config.args.clone());
            Box::new(AnalyzerAnnotator::new(analyzer, converter))
        }
    };
    info!(backend = ?config.backend, command = %config.command, "anotador pronto");
    Ok(annotator)
}

/// Resultado de uma execução sobre o corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub annotated: Vec<DocumentId>,
    pub failed: Vec<(DocumentId, String)>,
    pub processing_ms: u64,
}

impl RunReport {
    fn record(&mut self, id: DocumentId, outcome: Result<()>) {
        match outcome {
            Ok(()) => self.annotated.push(id),
            Err(e) => {
                error!(document = %id, error = %e, "documento descartado");
                self.failed.push((id, e.to_string()));
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Anota todos os documentos do corpus e grava os artefatos.
pub struct MorphologicalAnalysisPipeline {
    annotator: Box<dyn Annotator>,
    parallel: bool,
}

impl MorphologicalAnalysisPipeline {
    pub fn new(annotator: Box<dyn Annotator>) -> Self {
        Self {
            annotator,
            parallel: false,
        }
    }

    /// Documentos em workers do rayon; cada um ainda é processado de ponta a ponta.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn annotator(&self) -> &dyn Annotator {
        self.annotator.as_ref()
    }

    /// Anota um documento em memória (substitui sentenças anteriores).
    pub fn annotate_document(&self, document: &mut Document) -> Result<()> {
        let sentences = self.annotator.annotate(document.raw_text())?;
        info!(document = %document.id(), sentences = sentences.len(), "documento anotado");
        document.set_sentences(sentences);
        Ok(())
    }

    fn process(&self, store: &DocumentStore, document: &mut Document) -> Result<()> {
        self.annotate_document(document)?;
        store.persist_annotations(document)
    }

    pub fn run(&self, corpus: &mut CorpusManager) -> RunReport {
        let start = Instant::now();
        let store = corpus.store().clone();
        let mut report = RunReport::default();

        if self.parallel {
            let outcomes: Vec<(DocumentId, Result<()>)> = corpus
                .documents_mut()
                .par_iter_mut()
                .map(|(id, document)| (*id, self.process(&store, document)))
                .collect();
            for (id, outcome) in outcomes {
                report.record(id, outcome);
            }
        } else {
            for (id, document) in corpus.documents_mut().iter_mut() {
                let outcome = self.process(&store, document);
                report.record(*id, outcome);
            }
        }

        report.processing_ms = start.elapsed().as_millis() as u64;
        info!(
            annotated = report.annotated.len(),
            failed = report.failed.len(),
            ms = report.processing_ms,
            "execução concluída"
        );
        report
    }
}

/// Recebe a frequência de classes de um documento (ponto de extensão da
/// visualização).
pub trait FrequencyReporter {
    fn report(&self, store: &DocumentStore, document: &Document) -> Result<()>;
}

/// Grava `{id}_pos_frequency.tsv`, uma classe por linha, em ordem decrescente.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsvFrequencyReport;

impl FrequencyReporter for TsvFrequencyReport {
    fn report(&self, store: &DocumentStore, document: &Document) -> Result<()> {
        let mut rows: Vec<(&UdPos, &usize)> = document.pos_frequency().iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

        let mut out = String::from("POS\tcount\n");
        for (pos, count) in rows {
            let _ = writeln!(out, "{pos}\t{count}");
        }
        fs::write(store.path(document.id(), ArtifactKind::PosFrequency), out)?;
        Ok(())
    }
}

/// Conta classes gramaticais a partir do CONLL-U gravado.
pub struct PosFrequencyPipeline<R = TsvFrequencyReport> {
    reporter: R,
}

impl PosFrequencyPipeline {
    pub fn new() -> Self {
        Self {
            reporter: TsvFrequencyReport,
        }
    }
}

impl Default for PosFrequencyPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: FrequencyReporter> PosFrequencyPipeline<R> {
    pub fn with_reporter(reporter: R) -> Self {
        Self { reporter }
    }

    /// Relê, conta, atualiza metadados e chama o reporter, documento a documento.
    pub fn run(&self, corpus: &mut CorpusManager) -> Result<BTreeMap<DocumentId, BTreeMap<UdPos, usize>>> {
        let store = corpus.store().clone();
        let mut all = BTreeMap::new();

        for (id, document) in corpus.documents_mut().iter_mut() {
            let sentences = store.read_conllu(*id, true)?;
            document.set_sentences(sentences);
            let frequency = document.count_pos();
            document.set_pos_frequency(frequency.clone());

            store.extend_meta(*id, &frequency)?;

            self.reporter.report(&store, document)?;
            info!(document = %id, classes = frequency.len(), "frequências registradas");
            all.insert(*id, frequency);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AnalyzerRecord, Candidate, StaticAnalyzer};
    use crate::error::Error;

    fn annotator() -> Box<dyn Annotator> {
        let records = vec![
            AnalyzerRecord::word(
                "Привет",
                vec![Candidate { lemma: "привет".to_string(), tag: "INTJ=".to_string() }],
            ),
            AnalyzerRecord::separator(" "),
            AnalyzerRecord::word(
                "мир",
                vec![Candidate { lemma: "мир".to_string(), tag: "S,муж,неод=им,ед".to_string() }],
            ),
            AnalyzerRecord::separator(" "),
        ];
        Box::new(AnalyzerAnnotator::new(
            StaticAnalyzer::new(records),
            MystemTagConverter::bundled().unwrap(),
        ))
    }

    #[test]
    fn test_annotate_document_replaces_sentences() {
        let pipeline = MorphologicalAnalysisPipeline::new(annotator());
        let mut doc = Document::new(DocumentId::new(1).unwrap(), "Привет, мир!");
        pipeline.annotate_document(&mut doc).unwrap();
        pipeline.annotate_document(&mut doc).unwrap();
        assert_eq!(doc.sentences().len(), 1);
        assert_eq!(doc.sentences()[0].cleaned(), "привет мир");
    }

    #[test]
    fn test_failed_document_is_reported_not_written() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1_raw.txt"), "Привет, мир!").unwrap();
        fs::write(dir.path().join("1_meta.json"), "{\"id\": 1}").unwrap();
        fs::write(dir.path().join("2_raw.txt"), "Привет, мир! Ещё слова.").unwrap();
        fs::write(dir.path().join("2_meta.json"), "{\"id\": 2}").unwrap();

        let mut corpus = CorpusManager::load(dir.path()).unwrap();
        let report = MorphologicalAnalysisPipeline::new(annotator()).run(&mut corpus);

        let one = DocumentId::new(1).unwrap();
        let two = DocumentId::new(2).unwrap();
        assert_eq!(report.annotated, vec![one]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, two);
        assert!(!report.is_success());
        assert!(corpus.store().path(one, ArtifactKind::PosConllu).exists());
        assert!(!corpus.store().path(two, ArtifactKind::PosConllu).exists());
        assert!(!corpus.store().path(two, ArtifactKind::Cleaned).exists());
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        for id in 1..=4 {
            fs::write(dir.path().join(format!("{id}_raw.txt")), "Привет, мир!").unwrap();
            fs::write(dir.path().join(format!("{id}_meta.json")), format!("{{\"id\": {id}}}")).unwrap();
        }

        let mut sequential = CorpusManager::load(dir.path()).unwrap();
        let mut parallel = CorpusManager::load(dir.path()).unwrap();
        let seq = MorphologicalAnalysisPipeline::new(annotator()).run(&mut sequential);
        let par = MorphologicalAnalysisPipeline::new(annotator()).parallel(true).run(&mut parallel);

        assert_eq!(seq.annotated, par.annotated);
        assert_eq!(sequential.documents(), parallel.documents());
    }

    #[test]
    fn test_frequency_phase_updates_meta() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("3_raw.txt"), "Привет, мир!").unwrap();
        fs::write(
            dir.path().join("3_meta.json"),
            "{\"id\": 3, \"title\": \"Заголовок\", \"date\": \"вчера\", \"source\": \"rss\"}",
        )
        .unwrap();

        let mut corpus = CorpusManager::load(dir.path()).unwrap();
        MorphologicalAnalysisPipeline::new(annotator()).run(&mut corpus);
        let all = PosFrequencyPipeline::new().run(&mut corpus).unwrap();

        let id = DocumentId::new(3).unwrap();
        let freq = &all[&id];
        assert_eq!(freq.get(&UdPos::Intj), Some(&1));
        assert_eq!(freq.get(&UdPos::Noun), Some(&1));
        assert_eq!(freq.get(&UdPos::Punct), Some(&1));

        let meta = corpus.store().read_meta(id).unwrap();
        assert_eq!(meta.part_of_speech_frequency.as_ref(), Some(freq));
        assert_eq!(meta.title.as_deref(), Some("Заголовок"));
        assert!(meta.extra.contains_key("source"));

        let raw_meta = fs::read_to_string(corpus.store().path(id, ArtifactKind::Meta)).unwrap();
        assert!(raw_meta.contains("\"вчера\""));
        assert!(!raw_meta.contains("null"));

        let tsv = fs::read_to_string(corpus.store().path(id, ArtifactKind::PosFrequency)).unwrap();
        assert!(tsv.starts_with("POS\tcount\n"));
        assert_eq!(tsv.lines().count(), 4);
    }

    #[test]
    fn test_frequency_phase_requires_annotations() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1_raw.txt"), "x").unwrap();
        fs::write(dir.path().join("1_meta.json"), "{\"id\": 1}").unwrap();
        let mut corpus = CorpusManager::load(dir.path()).unwrap();
        assert!(matches!(PosFrequencyPipeline::new().run(&mut corpus), Err(Error::Io(_))));
    }

    #[test]
    fn test_annotator_for_rejects_bad_mapping() {
        let config = AnalyzerConfig {
            backend: Backend::OpenCorpora,
            command: "pymorphy-json".to_string(),
            args: vec![],
            mapping: Some("/nonexistent/mapping.json".into()),
        };
        assert!(matches!(annotator_for(&config), Err(Error::Mapping { .. })));
    }
}

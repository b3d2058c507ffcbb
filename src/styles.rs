//! Summary styles: named persona and formatting presets.
//!
//! The catalog is built once at startup and never mutated. Lookups never
//! fail: an unknown identifier falls back to the default style so a typo in
//! the `style` parameter never blocks the user.

use std::collections::HashMap;

use crate::{Result, TermsumError};

/// Identifier of the style used when none (or an unknown one) is requested.
pub const DEFAULT_STYLE: &str = "curto";

/// Prompt-construction parameters for one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    pub id: String,
    pub persona: String,
    pub instruction: String,
    pub constraints: String,
    /// Output token budget. `None` leaves the upstream default in place.
    pub max_output_tokens: Option<u32>,
}

impl StyleEntry {
    pub fn new(
        id: impl Into<String>,
        persona: impl Into<String>,
        instruction: impl Into<String>,
        constraints: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            persona: persona.into(),
            instruction: instruction.into(),
            constraints: constraints.into(),
            max_output_tokens: None,
        }
    }

    /// Set the output token budget.
    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }
}

/// Fixed mapping from style identifiers to [`StyleEntry`].
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    entries: HashMap<String, StyleEntry>,
    default: StyleEntry,
}

impl StyleCatalog {
    /// Build a catalog from explicit entries.
    ///
    /// Fails if `default_id` is not among `entries`, since every lookup
    /// must be able to fall back to it.
    pub fn new(entries: Vec<StyleEntry>, default_id: impl Into<String>) -> Result<Self> {
        let default_id = default_id.into();
        let entries: HashMap<String, StyleEntry> =
            entries.into_iter().map(|e| (e.id.clone(), e)).collect();
        let default = entries.get(&default_id).cloned().ok_or_else(|| {
            TermsumError::Configuration(format!("default style '{default_id}' is not defined"))
        })?;
        Ok(Self { entries, default })
    }

    /// The four built-in styles: `curto`, `detalhado`, `el5`, `riscos`.
    pub fn builtin() -> Self {
        let entries = builtin_entries();
        let default = entries[0].clone();
        Self {
            entries: entries.into_iter().map(|e| (e.id.clone(), e)).collect(),
            default,
        }
    }

    /// Resolve a style, falling back to the default for unknown identifiers.
    pub fn lookup(&self, style_id: &str) -> &StyleEntry {
        self.entries.get(style_id).unwrap_or(&self.default)
    }

    /// Whether `style_id` names a defined style (no fallback).
    pub fn contains(&self, style_id: &str) -> bool {
        self.entries.contains_key(style_id)
    }

    /// Identifier of the fallback style.
    pub fn default_id(&self) -> &str {
        &self.default.id
    }

    /// Defined identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Built-in styles; the first entry is the default.
fn builtin_entries() -> Vec<StyleEntry> {
    vec![
        StyleEntry::new(
            "curto",
            "Editor Chefe de Tecnologia e Defesa do Consumidor (Estilo 'TL;DR').",
            concat!(
                "A tua missão é poupar tempo. Identifica IMEDIATAMENTE as 'armadilhas'. ",
                "Não faças introduções. Vai direto aos factos.",
                "\nESTRUTURA OBRIGATÓRIA:",
                "\n1. 💰 **Custos Reais:** (Quanto custa? Renova sozinho?)",
                "\n2. 🚨 **Riscos Críticos:** (O que perco? Onde estão os meus dados?)",
                "\n3. 🚪 **Como Sair:** (É difícil cancelar?)",
            ),
            "Máximo 400 palavras. Usa bullet points curtos. Sem 'juridiquês'.",
        )
        .max_output_tokens(1500),
        StyleEntry::new(
            "detalhado",
            "Advogado Sénior Especialista em Direito do Consumidor Europeu e RGPD.",
            concat!(
                "Faz uma análise forense do documento. Identifica cláusulas abusivas à luz da lei ",
                "portuguesa/europeia (DL 446/85, RGPD, Lei de Defesa do Consumidor). ",
                "Explica o impacto prático de cada termo técnico.",
                "\nESTRUTURA:",
                "\n- Análise de Privacidade (RGPD)",
                "\n- Propriedade Intelectual (Conteúdos do utilizador)",
                "\n- Resolução de Litígios (Arbitragem vs Tribunais)",
                "\n- Cláusulas de Exclusão de Responsabilidade",
            ),
            "Cita conceitos legais relevantes. Sê exaustivo e completa o raciocínio.",
        )
        .max_output_tokens(8000),
        StyleEntry::new(
            "el5",
            "Professor do Ensino Básico (Explicar a uma Criança de 10 anos).",
            concat!(
                "Traduz tudo para analogias do recreio ou da vida doméstica. ",
                "Se fala em 'dados biométricos', diz 'o formato do teu rosto'. ",
                "Se fala em 'renúncia de foro', diz 'não podes fazer queixa à professora'.",
            ),
            "Usa emojis. Linguagem super simples. Zero termos técnicos.",
        )
        .max_output_tokens(2000),
        StyleEntry::new(
            "riscos",
            "Auditor de Segurança Paranóico (Red Team).",
            concat!(
                "O teu único objetivo é encontrar motivos para NÃO ACEITAR este contrato. ",
                "Ignora os benefícios. Foca-te no pior cenário possível (Worst-Case Scenario). ",
                "Destaca: Venda de dados, multas escondidas, vigilância.",
            ),
            "Usa 🛑 para perigos extremos e ⚠️ para alertas. Sê alarmista mas factual.",
        )
        .max_output_tokens(3000),
    ]
}

//! Prompt construction.
//!
//! Output is a pure function of its inputs: identical (text, style, custom
//! instruction) always produce byte-identical prompts. The response cache is
//! keyed on a prefix of the same inputs and relies on this.

use crate::styles::StyleEntry;

/// Default cap on how much of the document is embedded in the prompt.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 100_000;

/// First line the model must emit, verbatim.
pub const DISCLAIMER: &str = "> **⚠️ AVISO:** Análise gerada por IA (Modelo Sonar-Pro). Não dispensa consulta jurídica profissional.";

const ASSISTANT_IDENTITY: &str = "Tu és a IA 'Termos Claros'.";
const LANGUAGE_DIRECTIVE: &str = "IDIOMA: Português de Portugal (PT-PT) nativo e fluente.";
const USER_REQUEST_HEADER: &str = "ATENÇÃO AO PEDIDO DO UTILIZADOR:";

/// A system/user prompt pair ready for a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub system: String,
    pub user: String,
}

/// Limits applied while building the user prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    /// Maximum number of characters of the document embedded in the prompt.
    pub max_text_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

/// Compose the system and user prompts for one summary request.
///
/// The user prompt reports the character count of the full `text`, then
/// embeds at most `limits.max_text_chars` characters of it.
pub fn build_prompts(
    text: &str,
    style: &StyleEntry,
    custom_instruction: &str,
    limits: PromptLimits,
) -> Prompts {
    let system = format!(
        "{ASSISTANT_IDENTITY}\n\
         PERSONA: {}\n\
         OBJETIVO: {}\n\
         RESTRIÇÕES: {}\n\
         {LANGUAGE_DIRECTIVE}",
        style.persona, style.instruction, style.constraints,
    );

    let original_chars = text.chars().count();
    let embedded = truncate_chars(text, limits.max_text_chars);

    let mut user = format!(
        "Analisa este texto legal ({original_chars} caracteres). Texto abaixo:\n\n\
         '''{embedded}'''\n\n\
         --- INSTRUÇÃO FINAL DE FORMATAÇÃO ---\n\
         1. Começa SEMPRE com este bloco exato (usa o quote >):\n   \
         {DISCLAIMER}\n\n\
         2. Usa Markdown rico (negrito, tabelas, listas).\n\
         3. Se houver valores monetários ou prazos, CRIA UMA TABELA."
    );

    if !custom_instruction.is_empty() {
        user.push_str("\n\n");
        user.push_str(USER_REQUEST_HEADER);
        user.push(' ');
        user.push_str(custom_instruction);
    }

    Prompts { system, user }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
///
/// Counts Unicode scalar values, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("ação", 2), "aç");
        assert_eq!(truncate_chars("ação", 4), "ação");
        assert_eq!(truncate_chars("ação", 10), "ação");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn user_prompt_continuation_lines_are_exact() {
        let style = StyleEntry::new("s", "p", "i", "c");
        let prompts = build_prompts("texto legal", &style, "", PromptLimits::default());
        assert!(
            prompts
                .user
                .contains("(usa o quote >):\n   > **⚠️ AVISO:**")
        );
        assert!(prompts.user.contains("\n\n'''texto legal'''\n\n"));
        assert!(prompts.user.ends_with("CRIA UMA TABELA."));
    }
}

use termsum::prompt::DISCLAIMER;
use termsum::{PromptLimits, StyleCatalog, build_prompts};

fn limits(max_text_chars: usize) -> PromptLimits {
    PromptLimits { max_text_chars }
}

#[test]
fn identical_inputs_give_identical_prompts() {
    let catalog = StyleCatalog::default();
    let style = catalog.lookup("detalhado");
    let a = build_prompts("Cláusula 1. O serviço é gratuito.", style, "", PromptLimits::default());
    let b = build_prompts("Cláusula 1. O serviço é gratuito.", style, "", PromptLimits::default());
    assert_eq!(a, b);
}

#[test]
fn system_prompt_carries_style_fields() {
    let catalog = StyleCatalog::default();
    let style = catalog.lookup("riscos");
    let prompts = build_prompts("texto", style, "", PromptLimits::default());

    assert!(prompts.system.starts_with("Tu és a IA 'Termos Claros'."));
    assert!(prompts.system.contains(&format!("PERSONA: {}", style.persona)));
    assert!(prompts.system.contains(&format!("OBJETIVO: {}", style.instruction)));
    assert!(prompts.system.contains(&format!("RESTRIÇÕES: {}", style.constraints)));
    assert!(prompts.system.ends_with("IDIOMA: Português de Portugal (PT-PT) nativo e fluente."));
}

#[test]
fn user_prompt_embeds_text_and_disclaimer() {
    let catalog = StyleCatalog::default();
    let prompts = build_prompts("We may sell your data.", catalog.lookup("curto"), "", PromptLimits::default());

    assert!(prompts.user.contains("(22 caracteres)"));
    assert!(prompts.user.contains("'''We may sell your data.'''"));
    assert!(prompts.user.contains(DISCLAIMER));
    assert!(!prompts.user.contains("ATENÇÃO AO PEDIDO DO UTILIZADOR"));
}

#[test]
fn long_text_is_truncated_but_original_length_reported() {
    let catalog = StyleCatalog::default();
    let text = "ã".repeat(150);
    let prompts = build_prompts(&text, catalog.lookup("curto"), "", limits(100));

    assert!(prompts.user.contains("(150 caracteres)"));
    assert!(prompts.user.contains(&format!("'''{}'''", "ã".repeat(100))));
    assert!(!prompts.user.contains(&"ã".repeat(101)));
}

#[test]
fn custom_instruction_is_appended_last() {
    let catalog = StyleCatalog::default();
    let prompts = build_prompts(
        "texto legal",
        catalog.lookup("curto"),
        "Foca nos prazos de cancelamento.",
        PromptLimits::default(),
    );
    assert!(
        prompts
            .user
            .ends_with("\n\nATENÇÃO AO PEDIDO DO UTILIZADOR: Foca nos prazos de cancelamento.")
    );
}

#[test]
fn empty_text_still_builds() {
    let catalog = StyleCatalog::default();
    let prompts = build_prompts("", catalog.lookup("el5"), "", PromptLimits::default());
    assert!(prompts.user.contains("(0 caracteres)"));
    assert!(prompts.user.contains("''''''"));
}

/// Mandatory extraction rules embedded in every prompt. Kept as data, not
/// code, so deployments can swap the rules without touching the pipeline.
pub const DEFAULT_EXTRACTION_RULES: &str = "\
REGRAS OBRIGATÓRIAS:
- Extraia APENAS informações literalmente presentes no texto.
- NÃO faça inferências.
- NÃO invente dados.
- Se não encontrar claramente, retorne null.
- Retorne APENAS JSON válido, sem texto adicional.";

/// Renders the generation prompt from persona, rules, assembled context and
/// the ordered field list.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    rules: String,
}

impl PromptTemplate {
    pub fn new(rules: String) -> Self {
        Self { rules }
    }

    pub fn render(&self, persona: &str, context: &str, fields: &[String]) -> String {
        let field_list = fields
            .iter()
            .map(|field| format!("- {field}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{persona}\n\n{rules}\n\nCONTEXTO:\n---\n{context}\n---\n\nRetorne JSON com as chaves:\n{field_list}\n",
            rules = self.rules,
        )
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACTION_RULES.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_persona_rules_context_and_fields() {
        let template = PromptTemplate::default();
        let fields = vec!["cnpj_devedor".to_string(), "nome_devedor".to_string()];
        let prompt = template.render("Você é um assistente.", "TEXTO DO CONTEXTO", &fields);

        assert!(prompt.starts_with("Você é um assistente."));
        assert!(prompt.contains("REGRAS OBRIGATÓRIAS:"));
        assert!(prompt.contains("TEXTO DO CONTEXTO"));
        assert!(prompt.contains("- cnpj_devedor"));
        assert!(prompt.contains("- nome_devedor"));
    }

    #[test]
    fn fields_render_in_request_order() {
        let template = PromptTemplate::default();
        let fields = vec!["zzz".to_string(), "aaa".to_string()];
        let prompt = template.render("persona", "ctx", &fields);

        let z_position = prompt.find("- zzz").expect("zzz present");
        let a_position = prompt.find("- aaa").expect("aaa present");
        assert!(z_position < a_position);
    }

    #[test]
    fn custom_rules_replace_the_default_block() {
        let template = PromptTemplate::new("RULES: output JSON only.".to_string());
        let prompt = template.render("persona", "ctx", &["f".to_string()]);
        assert!(prompt.contains("RULES: output JSON only."));
        assert!(!prompt.contains("REGRAS OBRIGATÓRIAS"));
    }
}

//! LLM prompts for triple and JSON-LD extraction

use kgweave_domain::OntologyInfo;
use serde_json::Value;
use std::collections::HashMap;

/// System prompt for triple extraction
pub const TRIPLE_SYSTEM_PROMPT: &str = r#"You are an AI expert specialized in knowledge graph extraction.
Your task is to identify and extract ALL factual Subject-Predicate-Object (SPO) triples from the given text.
Focus on extracting multiple relationships and be thorough in identifying all possible connections.
Adhere strictly to the JSON output format requested in the user prompt.
Extract both core entities and their relationships, including biographical facts, achievements, and connections."#;

/// User prompt for triple extraction; `{text_chunk}` is replaced by the chunk
pub const TRIPLE_USER_PROMPT_TEMPLATE: &str = r#"Please extract ALL Subject-Predicate-Object (S-P-O) triples from the text below.

**VERY IMPORTANT RULES:**
1. **Output Format:** Respond ONLY with a single, valid JSON array. Each element MUST be an object with keys "subject", "predicate", "object". Return an array even if it contains a single element.
2. **JSON Only:** Do NOT include any text before or after the JSON array. Do NOT use markdown code fences.
3. **Concise Predicates:** Keep the "predicate" value to 1-3 words. Use verbs or short verb phrases (e.g. "discovered", "was born in", "won").
4. **Lowercase:** ALL values for "subject", "predicate" and "object" MUST be lowercase.
5. **Pronoun Resolution:** Replace pronouns with the lowercase name of the entity they refer to (e.g. "marie curie").
6. **Specificity:** Capture specific details ("nobel prize in physics" rather than "nobel prize" when the text says so).
7. **Completeness:** Extract ALL distinct factual relationships mentioned.

**Text to Process:**
```text
{text_chunk}
```

**Required JSON Output Format Example:**
[
  { "subject": "marie curie", "predicate": "discovered", "object": "radium" },
  { "subject": "marie curie", "predicate": "won", "object": "nobel prize in physics" }
]

**Your JSON Output (MUST start with '[' and end with ']'):**"#;

/// System prompt for JSON-LD extraction; filled with the ontology vocabulary
pub const JSONLD_SYSTEM_PROMPT_TEMPLATE: &str = r#"You are an AI expert in knowledge graph construction with OWL ontologies and JSON-LD.
You convert text into JSON-LD that conforms EXACTLY to the ontology below.

Base IRI: {base_iri}

Allowed classes: {classes}
Allowed object properties (values are entity IRIs): {object_properties}
Allowed data properties (values are literals): {data_properties}

JSON-LD context:
{context}

Ontology source:
{ontology_owl}

Rules:
- Use ONLY the classes and properties listed above. Never invent new terms.
- Every entity MUST have an "@id" (an IRI under the base IRI) and an "@type".
- Refer to other entities by their "@id".
- Respond ONLY with one JSON object containing "@context" and "@graph"."#;

/// User prompt for JSON-LD extraction; `{text_chunk}` is replaced by the chunk
pub const JSONLD_USER_PROMPT_TEMPLATE: &str = r#"Extract every entity and relationship from the text below that the ontology can express.

Classes: {classes}
Object properties: {object_properties}
Data properties: {data_properties}

**Text to Process:**
```text
{text_chunk}
```

**Required JSON Output Format:**
{
  "@context": { ... the context above ... },
  "@graph": [
    { "@id": "{base_iri}entity1", "@type": "SomeClass", "someDataProperty": "value", "someObjectProperty": "{base_iri}entity2" }
  ]
}

**Your JSON Output (a single JSON object):**"#;

/// Fills prompt templates for one extraction mode.
///
/// Placeholders are `{name}`. Substitution is a single pass, so braces inside
/// the chunk text or the ontology source are never expanded again. Unknown
/// placeholders and literal JSON braces are left as they are.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_template: &'static str,
    user_template: &'static str,
    vars: HashMap<&'static str, String>,
}

impl PromptBuilder {
    /// Prompts for triple extraction
    pub fn triples() -> Self {
        Self {
            system_template: TRIPLE_SYSTEM_PROMPT,
            user_template: TRIPLE_USER_PROMPT_TEMPLATE,
            vars: HashMap::new(),
        }
    }

    /// Prompts for JSON-LD extraction against an ontology
    pub fn jsonld(info: &OntologyInfo, context: &Value, ontology_owl: &str) -> Self {
        let context = serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());

        let mut vars = HashMap::new();
        vars.insert("classes", info.classes.join(", "));
        vars.insert("object_properties", info.object_properties.join(", "));
        vars.insert("data_properties", info.data_properties.join(", "));
        vars.insert("base_iri", info.base_iri.clone());
        vars.insert("context", context);
        vars.insert("ontology_owl", ontology_owl.to_string());

        Self {
            system_template: JSONLD_SYSTEM_PROMPT_TEMPLATE,
            user_template: JSONLD_USER_PROMPT_TEMPLATE,
            vars,
        }
    }

    /// The system prompt, identical for every chunk
    pub fn system_prompt(&self) -> String {
        render(self.system_template, &self.vars, None)
    }

    /// The user prompt for one chunk
    pub fn user_prompt(&self, text_chunk: &str) -> String {
        render(self.user_template, &self.vars, Some(text_chunk))
    }
}

fn render(template: &str, vars: &HashMap<&'static str, String>, text_chunk: Option<&str>) -> String {
    let mut out = String::with_capacity(template.len() + text_chunk.map_or(0, str::len));
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let name = after
            .find('}')
            .map(|close| &after[..close])
            .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

        let value = match name {
            Some("text_chunk") => text_chunk,
            Some(name) => vars.get(name).map(String::as_str),
            None => None,
        };

        match (name, value) {
            (Some(name), Some(value)) => {
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

//! Prompt templates for the completion model.
//!
//! Each search kind has its own template. Both spell out the exact JSON
//! fields expected back, include an example of the reply shape, and share
//! the same verification clause so the model is told not to invent facts.
//! Building a prompt is pure string formatting; nothing here can fail.

use crate::models::SearchKind;

/// Number of authors requested per author-list search
pub const AUTHOR_COUNT: usize = 15;

/// Number of works requested per author
pub const WORKS_PER_AUTHOR: usize = 3;

/// Number of paragraphs requested for a subgenre essay
pub const ESSAY_PARAGRAPHS: usize = 3;

/// Content-accuracy clause shared by every template
pub const VERIFICATION_CLAUSE: &str = "\
  Não invente nada: use apenas autores, obras e datas reais e verificados.
  Se não tiver certeza de um fato, omita-o em vez de supor.";

/// Build the prompt for `kind` about `subgenre`
pub fn build_prompt(subgenre: &str, kind: SearchKind) -> String {
    match kind {
        SearchKind::AuthorList => authors_prompt(subgenre),
        SearchKind::SubgenreEssay => essay_prompt(subgenre),
    }
}

/// JSON field names the reply must carry for `kind`
pub fn required_fields(kind: SearchKind) -> &'static [&'static str] {
    match kind {
        SearchKind::AuthorList => &["name", "dates", "description", "works"],
        SearchKind::SubgenreEssay => &["description"],
    }
}

/// Author-list prompt
pub fn authors_prompt(subgenre: &str) -> String {
    format!(
        r#"
  Forneça uma lista de {count} autores proeminentes para o subgênero de mistério "{subgenre}".
  Retorne a resposta como JSON. Cada autor deve ter os seguintes campos:
  - "name": (String) O nome do autor.
  - "dates": (String) As datas de nascimento e morte (ex: "1890-1976" para falecidos, ou "1950 - em atividade" para vivos). Confirme em mais de uma fonte confiável se o autor ainda está vivo; para autores contemporâneos, verifique com atenção extra se continuam "em atividade" ou se faleceram recentemente.
  - "description": (String) Descrição objetiva e sucinta (2 frases ou menos) sobre o estilo e a contribuição do autor para o gênero.
  - "works": (Array de Strings) Uma lista de {works} obras notáveis. Se as obras foram lançadas no Brasil, use os títulos em português; caso contrário, use os títulos originais.

{verification}

  O formato da resposta deve ser uma lista de objetos JSON, como neste exemplo:
  [
    {{
      "name": "Nome do Autor",
      "dates": "Datas",
      "description": "Descrição.",
      "works": ["Obra 1", "Obra 2", "Obra 3"]
    }}
  ]
"#,
        count = AUTHOR_COUNT,
        subgenre = subgenre,
        works = WORKS_PER_AUTHOR,
        verification = VERIFICATION_CLAUSE,
    )
}

/// Subgenre-essay prompt
pub fn essay_prompt(subgenre: &str) -> String {
    format!(
        r#"
  Aja como um especialista em literatura de mistério e suspense. Forneça uma descrição sucinta, objetiva e envolvente sobre o subgênero de mistério "{subgenre}".
  A descrição deve cobrir, em um texto coeso:
  - Origens e contexto histórico do subgênero.
  - Principais características, temas e elementos narrativos que o definem.
  - Autores e obras considerados pilares ou exemplos seminais do subgênero.
  - Sua evolução e influência na literatura e em outras mídias.

  A resposta deve ser OBRIGATORIAMENTE estruturada em {paragraphs} parágrafos distintos, separados pelo caractere de quebra de linha (\n) dentro da string JSON.
  Cada parágrafo deve ter de 3 a 4 linhas de texto.

  Coloque títulos de obras entre aspas (por exemplo, "O Espião Que Saiu do Frio").

  REGRA DE FORMATAÇÃO:
  Todo termo, expressão ou título em língua estrangeira DEVE usar a tag HTML <i> (exemplo: <i>The Maltese Falcon</i>, <i>Whodunit</i>). Não use asteriscos nem markdown; use apenas a tag <i>.

{verification}

  Retorne a resposta como um objeto JSON com uma única chave "description".

  Exemplo de formato da resposta:
  {{
    "description": "Parágrafo 1 sobre origens...\n\nParágrafo 2 sobre características...\n\nParágrafo 3 sobre evolução..."
  }}
"#,
        subgenre = subgenre,
        paragraphs = ESSAY_PARAGRAPHS,
        verification = VERIFICATION_CLAUSE,
    )
}

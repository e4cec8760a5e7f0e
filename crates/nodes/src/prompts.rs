//! Fixed prompt text sent to the text-generation service.

use pipeline::Category;

/// Persona and structure rules for article drafting.
pub const ARTICLE_SYSTEM_PROMPT: &str = r##"You are 'The Homeland Insider,' a travel writer with a personal and authoritative voice. You grew up in Seoul, your partner is from Saigon, and together you now raise your family in Australia. Your blog is the honest, insider guide that bridges these two cultures for curious travelers.

Your tone is warm, confident and trustworthy, like a knowledgeable friend sharing hometown secrets. You help people experience your homelands like a local, not a tourist.

### Writing Directives ###

1. Dual-local perspective:
   - For Seoul, write from personal memory and lived experience ("When I was growing up...", "What locals really do is...").
   - For Saigon, frame advice as a tip from your partner, your "secret weapon", and stress its authenticity.
2. Parent perspective: where relevant, weave in practical family advice (stroller access, kid-friendly menus, places children genuinely enjoy).
3. Honest guide: name at least one over-hyped tourist trap that is skippable and recommend a more meaningful local alternative.
4. Include at least one personal anecdote and at least two insider tips.

### Structure ###

- Line 1: the title, reflecting the insider promise.
- Line 2: a subtitle hinting at the personal story or the specific advice inside.
- The body begins directly with a personal hook. Never repeat the title inside the body.
- Several sections, each with a practical, inviting H2 heading that includes a fitting emoji.
- Finish with a warm closing paragraph that reinforces your promise as a trusted guide. Do not use a heading such as 'Conclusion'.

### Required Output ###

- The very last line is a single line of relevant hashtags, e.g. "#Keyword1 #Keyword2 #Keyword3"."##;

pub fn article_user_prompt(primary: &str, secondary: &[String]) -> String {
    format!(
        "Primary Keyword: {primary}\nSecondary Keywords: {}",
        secondary.join(", ")
    )
}

/// Restricts classifier output to exactly one label.
pub fn category_system_prompt() -> String {
    let labels = Category::ASSIGNABLE
        .iter()
        .map(|c| format!("- {}", c.label()))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a content classifier for a travel blog. Read the blog topic and choose the \
         single most appropriate category from the list below. Reply with the category name \
         exactly as written and nothing else: no explanation, no punctuation, no quotes.\n\n\
         [Categories]\n{labels}"
    )
}

pub fn category_user_prompt(primary: &str) -> String {
    format!("Blog topic: '{primary}'")
}

/// Fixed photographic style for synthesised cover images.
pub const IMAGE_PROMPT_SYSTEM_PROMPT: &str = "You write prompts for a photorealistic image model. \
Given a travel article excerpt, reply with ONE prompt of at most 60 words describing a single \
cover photograph of the scene. Always use this style: shot on a full-frame DSLR with a 35mm \
f/1.8 lens, natural golden-hour light, shallow depth of field, rule-of-thirds composition, \
candid documentary travel photography, vivid but true-to-life colours. No text, logos, \
watermarks or recognisable faces. Reply with the prompt only.";

pub fn image_prompt_user_prompt(primary: &str, excerpt: &str) -> String {
    format!("Topic: {primary}\n\nArticle excerpt:\n{excerpt}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prompt_lists_every_label() {
        let prompt = category_system_prompt();
        for category in Category::ASSIGNABLE {
            assert!(prompt.contains(&format!("- {}", category.label())));
        }
        assert!(!prompt.contains("Uncategorized"));
    }

    #[test]
    fn article_prompt_asks_for_trailing_hashtag_line() {
        assert!(ARTICLE_SYSTEM_PROMPT
            .contains("The very last line is a single line of relevant hashtags"));
        assert!(ARTICLE_SYSTEM_PROMPT.ends_with("\"#Keyword1 #Keyword2 #Keyword3\"."));
        assert!(pipeline::types::is_hashtag_line("#Keyword1 #Keyword2 #Keyword3"));
    }

    #[test]
    fn article_prompt_embeds_keywords() {
        let prompt = article_user_prompt(
            "Seoul street food",
            &["night market".to_string(), "street vendor".to_string()],
        );
        assert_eq!(
            prompt,
            "Primary Keyword: Seoul street food\nSecondary Keywords: night market, street vendor"
        );
    }
}

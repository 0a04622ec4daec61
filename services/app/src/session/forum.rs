//! services/app/src/session/forum.rs
//!
//! The community forum board: an in-memory post list with a per-language
//! translation memo filled through the translation collaborator. Posts
//! themselves are seed data; only the memo mutates.

use bridge_ed_core::domain::{ForumPost, Language};
use bridge_ed_core::ports::{Clock, PortError, PortResult, TranslationService};

pub struct ForumBoard {
    posts: Vec<ForumPost>,
}

impl ForumBoard {
    /// Builds the board with the community seed posts.
    pub fn seeded(clock: &dyn Clock) -> Self {
        let now = clock.now();
        let post = |id: &str, author: &str, content: &str, language: Language| ForumPost {
            id: id.to_string(),
            author: author.to_string(),
            content: content.to_string(),
            language,
            timestamp: now,
            translations: Default::default(),
        };
        Self {
            posts: vec![
                post(
                    "1",
                    "Sarah (UK)",
                    "How does the study of Al-Jabr influence modern algorithms?",
                    Language::En,
                ),
                post(
                    "2",
                    "Ahmed (Egypt)",
                    "التفكير النقدي ضروري جداً لتطوير المجتمعات العربية.",
                    Language::Ar,
                ),
                post(
                    "3",
                    "Lucie (France)",
                    "La collaboration interdisciplinaire est la clé du futur.",
                    Language::Fr,
                ),
            ],
        }
    }

    pub fn posts(&self) -> &[ForumPost] {
        &self.posts
    }

    pub fn post(&self, id: &str) -> Option<&ForumPost> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Returns the post's content in the target language, translating through
    /// the collaborator at most once per (post, language) pair. A post
    /// already authored in the target language never calls out. Failures
    /// leave the memo unchanged.
    pub async fn translate_post(
        &mut self,
        post_id: &str,
        target: Language,
        translator: &dyn TranslationService,
    ) -> PortResult<String> {
        let post = self
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| PortError::NotFound(format!("forum post '{post_id}'")))?;

        if post.language == target {
            return Ok(post.content.clone());
        }
        if let Some(cached) = post.translations.get(&target) {
            return Ok(cached.clone());
        }

        let translated = translator.translate(&post.content, target).await?;
        post.translations.insert(target, translated.clone());
        Ok(translated)
    }
}

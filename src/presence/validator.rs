use super::{IncomingPost, Participant, Rejection};

pub fn has_image(post: &IncomingPost) -> bool {
    post.attachment_content_types
        .iter()
        .flatten()
        .any(|content_type| content_type.starts_with("image/"))
}

/// Checks the structural requirements of a presence post and returns the user to credit.
///
/// With `require_mention` the first mentioned user is credited and a post without
/// mentions is rejected; otherwise the first mention still wins and the author is
/// the fallback.
pub fn validate(post: &IncomingPost, require_mention: bool) -> Result<Participant, Rejection> {
    if !has_image(post) {
        return Err(Rejection::MissingImage);
    }

    match post.mentions.first() {
        Some(subject) => Ok(subject.clone()),
        None if require_mention => Err(Rejection::MissingMention),
        None => Ok(post.author.clone()),
    }
}

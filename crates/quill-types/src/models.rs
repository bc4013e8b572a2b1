/// Public identity of a registered user. The password hash never leaves the
/// database layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    /// Human-readable creation date, e.g. "October 18, 2026".
    pub date: String,
    /// Sanitized HTML.
    pub body: String,
    pub img_url: String,
    pub author_id: i64,
    pub author_name: String,
}

impl BlogPost {
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    /// Human-readable timestamp, e.g. "October 18, 2026, 09:05PM".
    pub date: String,
    /// Sanitized HTML.
    pub text: String,
    pub author_id: i64,
    pub author_name: String,
    pub post_id: i64,
}

/// Values needed to insert a post. `body` must already be sanitized.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
    pub author_id: i64,
}

/// The fields an author may change on an existing post.
#[derive(Debug, Clone)]
pub struct PostEdit {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_by(author_id: i64) -> BlogPost {
        BlogPost {
            id: 1,
            title: "t".into(),
            subtitle: "s".into(),
            date: "October 18, 2026".into(),
            body: "<p>b</p>".into(),
            img_url: "https://example.com/a.png".into(),
            author_id,
            author_name: "ann".into(),
        }
    }

    #[test]
    fn authorship_compares_ids() {
        let ann = User { id: 7, email: "ann@example.com".into(), name: "ann".into() };
        let bob = User { id: 8, email: "bob@example.com".into(), name: "bob".into() };

        assert!(post_by(7).is_authored_by(&ann));
        assert!(!post_by(7).is_authored_by(&bob));
    }
}

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::database::*;
use crate::*;
use snafu::ResultExt as _;

define_id!("articles", Article: self => self.id.thing());
define_id!("categories", Category: self => self.id.thing());
define_id!("users", User: self => self.id.thing());
define_id!("page_views", PageView: self => self.id.thing());

define_model!(Article);
define_model!(Category);
define_model!(User);

define_relation! {
    Article > record_view(id: &ArticleId, now: Timestamp) > Option<Article>
        where "UPDATE articles SET view_count += 1, last_viewed_at = $now WHERE id = type::thing('articles', $id) RETURN AFTER"
}

define_relation! {
    Article > published_since(since: Timestamp) > Option<Tally>
        where "SELECT count() AS total FROM articles WHERE published_at >= $since GROUP ALL"
}

define_relation! {
    Article > viewed_within(start: Timestamp, end: Timestamp) > Option<Tally>
        where "SELECT count() AS total FROM articles WHERE last_viewed_at >= $start AND last_viewed_at < $end GROUP ALL"
}

define_relation! {
    PageView > record(article: &ArticleId, day: Day, now: Timestamp) > Option<PageView>
        where "UPDATE type::thing('page_views', [$article, $day]) SET article_id = $article, day = $day, count = (count ?? 0) + 1, created_at = created_at ?? $now, last_updated = $now RETURN AFTER"
}

define_relation! {
    PageView > for_article(article: &ArticleId) > Vec<PageView>
        where "SELECT * FROM page_views WHERE article_id = $article ORDER BY day"
}

define_relation! {
    PageView > total_for_article(article: &ArticleId) > Option<Tally>
        where "SELECT math::sum(count) AS total FROM page_views WHERE article_id = $article GROUP ALL"
}

define_relation! {
    PageView > in_period(start: Day, end: Day) > Option<Tally>
        where "SELECT math::sum(count) AS total FROM page_views WHERE day >= $start AND day <= $end GROUP ALL"
}

define_relation! {
    PageView > on_day(day: Day) > Option<Tally>
        where "SELECT math::sum(count) AS total FROM page_views WHERE day = $day GROUP ALL"
}

define_relation! {
    User > tally() > Option<Tally>
        where "SELECT count() AS total FROM users GROUP ALL"
}

define_relation! {
    User > created_between(start: Timestamp, end: Timestamp) > Option<Tally>
        where "SELECT count() AS total FROM users WHERE created_at >= $start AND created_at < $end GROUP ALL"
}

pub use article::*;
pub use article_id::*;
pub use category::*;
pub use day::*;
pub use page_view::*;
pub use tally::*;
pub use timestamp::*;
pub use user::*;

mod article;
mod article_id;
mod category;
mod day;
mod page_view;
mod tally;
mod timestamp;
mod user;

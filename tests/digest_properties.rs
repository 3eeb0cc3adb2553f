//! Synthetic property checks for dedupe / sort / hero / rail.
//! Inputs are generated from fixed seeds so failures are reproducible.

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use news_digest::digest::{
    assemble_digest, dedupe, is_absolute_image, sort_by_recency, DEFAULT_MAX_ITEMS,
};
use news_digest::ingest::types::NewsItem;
use rand::{rngs::StdRng, Rng, SeedableRng};

const IMAGES: &[Option<&str>] = &[
    None,
    Some("https://cdn.example/a.jpg"),
    Some("/relative/b.jpg"),
    Some("//cdn.example/c.jpg"),
    Some("http://cdn.example/d.png"),
    Some("data:image/gif;base64,R0lGOD"),
];

fn random_items(rng: &mut StdRng, n: usize) -> Vec<NewsItem> {
    (0..n)
        .map(|_| {
            // Small link space forces duplicates; some links blank to exercise the title key.
            let link = match rng.random_range(0..10) {
                0 => String::new(),
                _ => format!("https://news.example/{}", rng.random_range(0..40)),
            };
            let title = format!("Headline {}", rng.random_range(0..30));
            let iso_date = if rng.random_bool(0.2) {
                None
            } else {
                Utc.timestamp_opt(1_751_000_000 + rng.random_range(0..500_000), 0).single()
            };
            NewsItem {
                title: Some(title),
                link,
                source: format!("S{}", rng.random_range(0..5)),
                iso_date,
                description: String::new(),
                image: IMAGES[rng.random_range(0..IMAGES.len())].map(str::to_string),
                byline: None,
            }
        })
        .collect()
}

fn key(it: &NewsItem) -> String {
    if it.link.trim().is_empty() {
        it.title.clone().unwrap_or_default().trim().to_string()
    } else {
        it.link.trim().to_string()
    }
}

#[test]
fn dedupe_is_idempotent_and_keeps_first() {
    for seed in 0..50u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let items = random_items(&mut rng, 80);
        let once = dedupe(items.clone());
        let twice = dedupe(once.clone());
        assert_eq!(once, twice, "seed {seed}");

        let keys: Vec<_> = once.iter().map(key).collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len(), "seed {seed}");

        // Every survivor is the first item in the input with its key.
        for kept in &once {
            let first = items.iter().find(|it| key(it) == key(kept)).unwrap();
            assert_eq!(first, kept, "seed {seed}");
        }
    }
}

#[test]
fn digest_invariants_hold_for_random_inputs() {
    let now = Utc.timestamp_opt(1_752_000_000, 0).unwrap();
    for seed in 0..100u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = rng.random_range(0..70);
        let max_items = rng.random_range(1..=DEFAULT_MAX_ITEMS);
        let items = random_items(&mut rng, n);
        let distinct = dedupe(items.clone()).len();

        let d = assemble_digest(items.clone(), "prop", max_items, now);

        assert_eq!(d.count, distinct, "seed {seed}");
        assert!(d.rail.len() <= max_items, "seed {seed}");
        assert_eq!(d.hero.is_none(), distinct == 0, "seed {seed}");

        // Rail is non-increasing by timestamp (missing = minimum).
        let ts: Vec<i64> = d
            .rail
            .iter()
            .map(|r| r.iso_date.map(|t| t.timestamp_millis()).unwrap_or(0))
            .collect();
        assert!(ts.windows(2).all(|w| w[0] >= w[1]), "seed {seed}: {ts:?}");

        if let Some(hero) = &d.hero {
            assert!(d.rail.iter().all(|r| r.link != hero.link), "seed {seed}");

            // Hero is the newest item with an absolute image, else the newest item.
            let mut sorted = dedupe(items.clone());
            sort_by_recency(&mut sorted);
            let expected = sorted
                .iter()
                .find(|it| it.image.as_deref().is_some_and(is_absolute_image))
                .unwrap_or(&sorted[0]);
            assert_eq!(hero, expected, "seed {seed}");
        }
    }
}

#[test]
fn tracking_parameters_are_not_merged() {
    let base = NewsItem {
        title: Some("Same story".into()),
        link: "https://news.example/story".into(),
        source: "A".into(),
        iso_date: None,
        description: String::new(),
        image: None,
        byline: None,
    };
    let tracked = NewsItem {
        link: "https://news.example/story?utm_source=rss".into(),
        ..base.clone()
    };
    assert_eq!(dedupe(vec![base, tracked]).len(), 2);
}

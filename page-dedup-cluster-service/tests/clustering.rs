//! End-to-end clustering scenarios over synthetic product pages.

use page_dedup_cluster::cancel::CancellationFlag;
use page_dedup_cluster::config::ClusterConfig;
use page_dedup_cluster::document::Document;
use page_dedup_cluster::pipeline::{cluster, Clustering};
use page_dedup_cluster::prune::jaccard_similarity;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn base_words(prefix: &str, len: usize) -> Vec<String> {
    (0..len).map(|i| format!("{prefix}{i}")).collect()
}

/// `base` with three words replaced, at a position depending on `variant`.
fn variant_of(base: &[String], variant: usize) -> String {
    let mut words = base.to_vec();
    if variant > 0 {
        let start = (variant * 5) % (base.len() - 3);
        for (offset, word) in words[start..start + 3].iter_mut().enumerate() {
            *word = format!("{}-edit{variant}x{offset}", base[0]);
        }
    }
    words.join(" ")
}

fn run(documents: Vec<Document>, config: &ClusterConfig) -> Clustering {
    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(0));
    cluster(documents, config, &mut rng, &CancellationFlag::new()).unwrap()
}

fn default_config() -> ClusterConfig {
    ClusterConfig {
        threshold: Some(0.2),
        seed: Some(2014),
        ..Default::default()
    }
}

#[test]
fn variants_of_one_page_share_a_bucket() {
    let base = base_words("acer", 60);
    let texts: Vec<String> = (0..10).map(|v| variant_of(&base, v)).collect();
    for text in &texts[1..] {
        let a: Vec<&str> = texts[0].split(' ').collect();
        let b: Vec<&str> = text.split(' ').collect();
        assert!(jaccard_similarity(&a, &b) >= 0.3);
    }
    let documents = texts
        .iter()
        .enumerate()
        .map(|(i, text)| Document::new(format!("page-{i}"), text.as_str(), 1).unwrap())
        .collect();

    let clustering = run(documents, &default_config());
    assert!(clustering.is_partition());
    assert!(clustering.leftovers().is_empty());
    assert_eq!(clustering.buckets().len(), 1);
    assert_eq!(clustering.buckets()[0].len(), 10);
    assert_eq!(clustering.bucket_ids()[0][0], "page-0");
}

#[test]
fn disjoint_pages_never_share_a_final_bucket() {
    let documents = vec![
        Document::new("laptop", base_words("laptop", 40).join(" "), 1).unwrap(),
        Document::new("camera", base_words("camera", 40).join(" "), 1).unwrap(),
    ];
    let clustering = run(documents, &default_config());
    assert!(clustering.is_partition());
    for bucket in clustering.bucket_ids() {
        assert_eq!(bucket.len(), 1, "{bucket:?}");
    }
    let placed = clustering.buckets().len() + clustering.leftovers().len();
    assert_eq!(placed, 2);
}

#[test]
fn two_product_families_are_kept_apart() {
    let laptops = base_words("aspire", 50);
    let cameras = base_words("clip", 50);
    let mut documents = Vec::new();
    for (family, base) in [("laptop", &laptops), ("camera", &cameras)] {
        for v in 0..5 {
            let text = variant_of(base, v);
            documents.push(Document::new(format!("{family}-{v}"), text, 1).unwrap());
        }
    }

    let clustering = run(documents, &default_config());
    assert!(clustering.is_partition());
    let buckets = clustering.bucket_ids();
    assert_eq!(
        buckets[0],
        vec!["laptop-0", "laptop-1", "laptop-2", "laptop-3", "laptop-4"]
    );
    for bucket in &buckets {
        let family = bucket[0].split('-').next().unwrap();
        assert!(bucket.iter().all(|id| id.starts_with(family)), "{bucket:?}");
    }
}

#[test]
fn same_seed_same_clusters() {
    let base = base_words("sensor", 30);
    let make = || -> Vec<Document> {
        (0..6)
            .map(|v| Document::new(format!("p{v}"), variant_of(&base, v), 1).unwrap())
            .collect()
    };
    let config = ClusterConfig {
        num_perm: 200,
        num_bands: 50,
        seed: Some(9),
        ..Default::default()
    };
    let first = run(make(), &config);
    let second = run(make(), &config);
    assert_eq!(first.bucket_ids(), second.bucket_ids());
    assert_eq!(first.leftover_ids(), second.leftover_ids());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn buckets_and_leftovers_partition_the_collection(
        pages in prop::collection::vec(prop::collection::vec(0usize..12, 1..20), 1..10),
        seed in any::<u64>(),
        threshold in 0.0f64..=1.0,
        shingle_size in 1usize..3,
    ) {
        let documents: Vec<Document> = pages
            .iter()
            .enumerate()
            .filter_map(|(i, words)| {
                let text: Vec<String> = words.iter().map(|w| format!("w{w}")).collect();
                Document::new(format!("doc-{i}"), text.join(" "), shingle_size).ok()
            })
            .collect();
        let expected = documents.len();
        let config = ClusterConfig {
            shingle_size,
            num_perm: 40,
            num_bands: 10,
            threshold: Some(threshold),
            seed: Some(seed),
        };

        let clustering = run(documents, &config);
        prop_assert!(clustering.is_partition());
        prop_assert!(clustering.buckets().iter().all(|bucket| !bucket.is_empty()));
        let placed: usize = clustering.buckets().iter().map(|b| b.len()).sum::<usize>()
            + clustering.leftovers().len();
        prop_assert_eq!(placed, expected);
    }
}

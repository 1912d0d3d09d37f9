// Candidate hostname generation

/// Cross product of base domains and wordlist fragments.
///
/// Output is domain-major: every fragment for the first domain, then every
/// fragment for the second, and so on. Fragments are not validated; names
/// that are not legal DNS labels simply fail to resolve later.
pub fn generate_candidates(domains: &[String], fragments: &[String]) -> Vec<String> {
    let mut candidates = Vec::with_capacity(domains.len() * fragments.len());
    for domain in domains {
        for fragment in fragments {
            candidates.push(format!("{}.{}", fragment, domain));
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_domain_major_order() {
        let domains = strings(&["a.com", "b.org"]);
        let fragments = strings(&["www", "api", "dev"]);

        let candidates = generate_candidates(&domains, &fragments);

        assert_eq!(
            candidates,
            strings(&[
                "www.a.com",
                "api.a.com",
                "dev.a.com",
                "www.b.org",
                "api.b.org",
                "dev.b.org",
            ])
        );
    }

    #[test]
    fn test_size_is_product() {
        for m in 0..5 {
            for n in 0..7 {
                let domains: Vec<String> = (0..m).map(|i| format!("d{}.com", i)).collect();
                let fragments: Vec<String> = (0..n).map(|i| format!("f{}", i)).collect();
                assert_eq!(generate_candidates(&domains, &fragments).len(), m * n);
            }
        }
    }

    #[test]
    fn test_empty_inputs() {
        let fragments = strings(&["www"]);
        let domains = strings(&["example.com"]);
        assert!(generate_candidates(&[], &fragments).is_empty());
        assert!(generate_candidates(&domains, &[]).is_empty());
    }

    #[test]
    fn test_fragments_are_not_validated() {
        let candidates = generate_candidates(&strings(&["example.com"]), &strings(&["not a label!"]));
        assert_eq!(candidates, strings(&["not a label!.example.com"]));
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let candidates =
            generate_candidates(&strings(&["example.com", "example.com"]), &strings(&["www"]));
        assert_eq!(candidates.len(), 2);
    }
}

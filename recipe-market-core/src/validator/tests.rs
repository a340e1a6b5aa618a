//! Tests for the catalog validators

#[cfg(test)]
mod validator_tests {
    use crate::bundle::{Bundle, RecipeDescriptor};
    use crate::environment::{Environment, StaticEnvironment};
    use crate::marketplace::{RecipeListing, RecipeMarketplace};
    use crate::validator::rules::{is_sentence_cased, DescriptionRule, DisplayNameRule};
    use crate::validator::{
        CompletenessValidator, ContentValidator, ListingRule, ValidationIssue, ValidationResult,
    };
    use pretty_assertions::assert_eq;

    fn listing(name: &str, display_name: &str, description: &str) -> RecipeListing {
        RecipeListing::new(name)
            .with_display_name(display_name)
            .with_description(description)
            .with_bundle(Bundle::new("maven", "org.example:recipes"))
    }

    fn descriptor(name: &str) -> RecipeDescriptor {
        RecipeDescriptor {
            name: name.to_string(),
            display_name: String::new(),
            description: String::new(),
            categories: Vec::new(),
            estimated_effort_per_occurrence: None,
            options: Vec::new(),
        }
    }

    fn marketplace_of(names: &[&str]) -> RecipeMarketplace {
        let mut marketplace = RecipeMarketplace::new();
        for (i, name) in names.iter().enumerate() {
            let path = if i % 2 == 0 { vec!["Java"] } else { vec![] };
            marketplace
                .install(listing(name, "Does things", ""), path.as_slice())
                .unwrap();
        }
        marketplace
    }

    #[test]
    fn test_sentence_case() {
        assert!(is_sentence_cased("Foo"));
        assert!(is_sentence_cased("`Foo` bar"));
        assert!(is_sentence_cased("\"Quoted\" thing"));
        assert!(is_sentence_cased("Élan"));
        assert!(!is_sentence_cased("foo"));
        assert!(!is_sentence_cased("`foo` bar"));
        assert!(!is_sentence_cased("`"));
        assert!(!is_sentence_cased(""));
    }

    #[test]
    fn test_display_name_rule() {
        let rule = DisplayNameRule;

        assert!(rule.check(&listing("a", "Foo", ""), "").is_empty());
        assert!(rule.check(&listing("a", "`Foo` bar", ""), "").is_empty());

        let trailing = rule.check(&listing("a", "Foo.", ""), "");
        assert_eq!(trailing.len(), 1);
        assert!(trailing[0].message.contains("period"));

        let lower = rule.check(&listing("a", "foo", ""), "");
        assert_eq!(lower.len(), 1);
        assert!(lower[0].message.contains("upper-case"));

        let both = rule.check(&listing("a", "foo.", ""), "");
        assert_eq!(both.len(), 2);

        let empty = rule.check(&listing("a", "", ""), "Java");
        assert_eq!(
            empty,
            vec![ValidationIssue {
                rule_id: "display-name",
                recipe: "a".to_string(),
                location: "Java".to_string(),
                message: "Display name is empty".to_string(),
            }]
        );
    }

    #[test]
    fn test_description_rule() {
        let rule = DescriptionRule;

        assert!(rule.check(&listing("a", "Foo", ""), "").is_empty());
        assert!(rule.check(&listing("a", "Foo", "Does a thing."), "").is_empty());

        let no_period = rule.check(&listing("a", "Foo", "Does a thing"), "");
        assert_eq!(no_period.len(), 1);
        assert_eq!(no_period[0].message, "Description must end with a period");

        let lower = rule.check(&listing("a", "Foo", "does a thing."), "");
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].rule_id, "description");
    }

    #[test]
    fn test_content_validator_accumulates_with_breadcrumbs() {
        let mut marketplace = RecipeMarketplace::new();
        marketplace
            .install(listing("good", "Good one", "Is fine."), &["Java"])
            .unwrap();
        marketplace
            .install(listing("bad1", "Foo.", ""), &["Java", "Cleanup"])
            .unwrap();
        marketplace
            .install(listing("bad2", "foo", "Does a thing"), &[] as &[&str])
            .unwrap();

        let result = ContentValidator::new().validate(marketplace.root());

        assert!(!result.is_valid());
        assert_eq!(result.len(), 3);

        let located: Vec<(&str, &str, &str)> = result
            .issues
            .iter()
            .map(|i| (i.recipe.as_str(), i.rule_id, i.location.as_str()))
            .collect();
        assert_eq!(
            located,
            vec![
                ("bad2", "display-name", ""),
                ("bad2", "description", ""),
                ("bad1", "display-name", "Java > Cleanup"),
            ]
        );
    }

    #[test]
    fn test_content_validator_on_sub_tree_includes_its_name() {
        let mut marketplace = RecipeMarketplace::new();
        marketplace
            .install(listing("bad", "bad", ""), &["Java", "Cleanup"])
            .unwrap();
        let java = &marketplace.root().categories()[0];

        let result = ContentValidator::new().validate(java);
        assert_eq!(result.issues[0].location, "Java > Cleanup");
    }

    #[test]
    fn test_custom_rules() {
        struct NoEmptyDescription;

        impl ListingRule for NoEmptyDescription {
            fn check(&self, listing: &RecipeListing, location: &str) -> Vec<ValidationIssue> {
                if listing.description.is_empty() {
                    vec![ValidationIssue {
                        rule_id: self.rule_id(),
                        recipe: listing.name.clone(),
                        location: location.to_string(),
                        message: "Description is required".to_string(),
                    }]
                } else {
                    Vec::new()
                }
            }

            fn rule_id(&self) -> &'static str {
                "description-required"
            }

            fn description(&self) -> &'static str {
                "Every recipe needs a description"
            }
        }

        let mut validator = ContentValidator::with_rules(Vec::new());
        validator.add_rule(Box::new(NoEmptyDescription));
        assert_eq!(
            validator.rules(),
            vec![("description-required", "Every recipe needs a description")]
        );

        let result = validator.validate(marketplace_of(&["a", "b"]).root());
        assert_eq!(result.by_rule("description-required").count(), 2);
    }

    #[test]
    fn test_completeness_identical_sets_is_valid() {
        let marketplace = marketplace_of(&["a", "b", "c"]);
        let environment =
            StaticEnvironment::new(vec![descriptor("c"), descriptor("a"), descriptor("b")]);

        let result = CompletenessValidator::new().validate(&marketplace, &environment);
        assert!(result.is_valid());
    }

    #[test]
    fn test_completeness_phantom_entry() {
        let marketplace = marketplace_of(&["a", "b", "c"]);
        let environment = StaticEnvironment::new(vec![descriptor("a"), descriptor("c")]);

        let result = CompletenessValidator::new().validate(&marketplace, &environment);
        assert_eq!(result.len(), 1);
        assert_eq!(result.issues[0].rule_id, CompletenessValidator::PHANTOM_ENTRY);
        assert_eq!(result.issues[0].recipe, "b");
        assert!(result.issues[0].message.contains("remove it from the catalog"));
    }

    #[test]
    fn test_completeness_missing_from_catalog() {
        let marketplace = marketplace_of(&["a", "c"]);
        let environment =
            StaticEnvironment::new(vec![descriptor("a"), descriptor("b"), descriptor("c")]);

        let result = CompletenessValidator::new().validate(&marketplace, &environment);
        assert_eq!(result.len(), 1);
        assert_eq!(
            result.issues[0].rule_id,
            CompletenessValidator::MISSING_FROM_CATALOG
        );
        assert_eq!(result.issues[0].recipe, "b");
        assert!(result.issues[0].message.contains("regenerate"));
    }

    #[test]
    fn test_completeness_reports_everything_sorted() {
        let marketplace = marketplace_of(&["z", "m", "a"]);
        let environment = StaticEnvironment::new(vec![descriptor("y"), descriptor("b")]);

        let result = CompletenessValidator::new().validate(&marketplace, &environment);
        let found: Vec<(&str, &str)> = result
            .issues
            .iter()
            .map(|i| (i.rule_id, i.recipe.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("phantom-entry", "a"),
                ("phantom-entry", "m"),
                ("phantom-entry", "z"),
                ("missing-from-catalog", "b"),
                ("missing-from-catalog", "y"),
            ]
        );
    }

    struct HalfBrokenEnvironment;

    impl Environment for HalfBrokenEnvironment {
        fn recipe_descriptors(&self) -> Vec<RecipeDescriptor> {
            vec![descriptor("a")]
        }

        fn unavailable_bundles(&self) -> Vec<(Bundle, String)> {
            vec![(
                Bundle::new("maven", "org.example:broken"),
                "artifact not found".to_string(),
            )]
        }
    }

    #[test]
    fn test_completeness_separates_unresolvable_bundles_from_phantoms() {
        let mut marketplace = marketplace_of(&["a", "c"]);
        marketplace
            .install(
                RecipeListing::new("b").with_bundle(Bundle::new("Maven", "org.example:broken")),
                &["Java"],
            )
            .unwrap();

        let result = CompletenessValidator::new().validate(&marketplace, &HalfBrokenEnvironment);
        let found: Vec<(&str, &str)> = result
            .issues
            .iter()
            .map(|i| (i.rule_id, i.recipe.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                (CompletenessValidator::UNRESOLVABLE_BUNDLE, "b"),
                (CompletenessValidator::PHANTOM_ENTRY, "c"),
            ]
        );
        assert!(result.issues[0].message.contains("artifact not found"));
        assert!(!result.issues[0].message.contains("remove it from the catalog"));
    }

    #[test]
    fn test_results_merge() {
        let marketplace = marketplace_of(&["a"]);
        let mut result = ContentValidator::new().validate(marketplace.root());
        assert!(result.is_empty());

        result.merge(CompletenessValidator::new().validate(
            &marketplace,
            &StaticEnvironment::default(),
        ));
        assert_eq!(result.len(), 1);
        assert_ne!(result, ValidationResult::default());
    }
}

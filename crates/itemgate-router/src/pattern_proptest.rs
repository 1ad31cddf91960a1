//! Property-based tests for route matching.

#[cfg(test)]
mod tests {
    use http::Method;
    use itemgate_core::{ApiRequest, ApiResponse};
    use proptest::prelude::*;

    use crate::auth::AuthGate;
    use crate::pattern::{PathPattern, PatternCache};
    use crate::router::Router;

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9._~%-]{1,24}"
    }

    fn literal_segment() -> impl Strategy<Value = String> {
        "[a-z]{1,12}"
    }

    fn router_with(literal: &str) -> Router {
        let mut router = Router::new(AuthGate::default());
        router
            .register(
                Method::GET,
                "/items/{itemId}",
                |_r: ApiRequest| async { Ok(ApiResponse::ok(&"param")) },
                false,
            )
            .unwrap();
        router
            .register(
                Method::GET,
                &format!("/items/{literal}"),
                |_r: ApiRequest| async { Ok(ApiResponse::ok(&"literal")) },
                false,
            )
            .unwrap();
        router
    }

    proptest! {
        #[test]
        fn test_parameter_equals_segment_text(prefix in literal_segment(), value in segment()) {
            let template = format!("/{prefix}/{{id}}");
            let pattern = PathPattern::parse(&template, &mut PatternCache::new()).unwrap();

            let params = pattern.match_path(&format!("/{prefix}/{value}"));
            prop_assert!(params.is_some());
            let params = params.unwrap();
            prop_assert_eq!(params.get("id"), Some(value.as_str()));
        }

        #[test]
        fn test_segment_count_must_match(prefix in literal_segment(), a in segment(), b in segment()) {
            let template = format!("/{prefix}/{{id}}");
            let pattern = PathPattern::parse(&template, &mut PatternCache::new()).unwrap();

            let too_long = format!("/{prefix}/{a}/{b}");
            let too_short = format!("/{prefix}");
            prop_assert!(pattern.match_path(&too_long).is_none());
            prop_assert!(pattern.match_path(&too_short).is_none());
        }

        #[test]
        fn test_literal_segment_must_match(prefix in literal_segment(), other in literal_segment(), value in segment()) {
            prop_assume!(prefix != other);
            let template = format!("/{prefix}/{{id}}");
            let pattern = PathPattern::parse(&template, &mut PatternCache::new()).unwrap();

            let path = format!("/{other}/{value}");
            prop_assert!(pattern.match_path(&path).is_none());
        }

        #[test]
        fn test_literal_route_beats_parameter_route(literal in literal_segment(), other in literal_segment()) {
            prop_assume!(literal != other);
            let router = router_with(&literal);

            let exact = router.match_route(&Method::GET, &format!("/items/{literal}")).unwrap();
            prop_assert_eq!(exact.template(), format!("/items/{literal}"));
            prop_assert!(exact.params().is_empty());

            let param = router.match_route(&Method::GET, &format!("/items/{other}")).unwrap();
            prop_assert_eq!(param.template(), "/items/{itemId}");
            prop_assert_eq!(param.params().get("itemId"), Some(other.as_str()));
        }
    }
}

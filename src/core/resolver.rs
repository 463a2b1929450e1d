//! Download and upload location resolution.
//!
//! Compiler locations are either absolute http(s) URLs, used verbatim, or
//! paths served by the file server's static route. Upload locations always
//! point at the file server, which relays the artifact to the caller's
//! destination passed as a query parameter. Route parameters become single
//! percent-encoded path segments.

use super::error::ResolutionError;
use super::routes::{
    FileServerHandler, FileServerRoutes, CC_BUILD_ARTIFACTS_UPLOAD_URI_KEY,
    CC_DROPLET_UPLOAD_URI_KEY,
};
use indexmap::IndexMap;
use url::{ParseError, Url};

/// Join URL fragments with exactly one `/` between each.
pub fn join_url(base: &str, parts: &[&str]) -> String {
    let mut joined = base.to_string();
    for part in parts {
        let part = part.trim_start_matches('/');
        if part.is_empty() {
            continue;
        }
        while joined.ends_with('/') {
            joined.pop();
        }
        joined.push('/');
        joined.push_str(part);
    }
    joined
}

fn parse_absolute(field: &'static str, value: &str) -> Result<Url, ResolutionError> {
    Url::parse(value).map_err(|e| ResolutionError::invalid_url(field, value, e))
}

fn route_segments(
    routes: &FileServerRoutes,
    handler: FileServerHandler,
    params: &[(&str, &str)],
) -> Result<Vec<String>, ResolutionError> {
    let route = routes
        .route_for(handler)
        .ok_or_else(|| ResolutionError::invalid_url("route", handler.to_string(), "no route"))?;
    route
        .segments_with_params(params)
        .map_err(|e| ResolutionError::invalid_url("route", route.path.clone(), e))
}

fn require_file_server(file_server_url: &str) -> Result<&str, ResolutionError> {
    if file_server_url.is_empty() {
        return Err(ResolutionError::NoFileServer);
    }
    Ok(file_server_url)
}

/// Resolve where the build tool for `stack` is downloaded from.
pub fn compiler_download_url(
    stack: &str,
    compilers: &IndexMap<String, String>,
    file_server_url: &str,
    routes: &FileServerRoutes,
) -> Result<String, ResolutionError> {
    let compiler_path = compilers
        .get(stack)
        .ok_or_else(|| ResolutionError::NoCompilerDefined {
            stack: stack.to_string(),
        })?;

    match Url::parse(compiler_path) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" => return Ok(compiler_path.clone()),
            other => {
                return Err(ResolutionError::UnsupportedScheme {
                    scheme: other.to_string(),
                })
            }
        },
        Err(ParseError::RelativeUrlWithoutBase) => {}
        Err(e) => return Err(ResolutionError::invalid_url("compiler", compiler_path, e)),
    }

    let base = require_file_server(file_server_url)?;
    let static_path = route_segments(routes, FileServerHandler::Static, &[])?.join("/");
    let joined = join_url(base, &[&static_path, compiler_path]);
    parse_absolute("compiler", &joined)?;
    Ok(joined)
}

fn upload_url(
    routes: &FileServerRoutes,
    handler: FileServerHandler,
    params: &[(&str, &str)],
    file_server_url: &str,
    query_key: &str,
    destination: &str,
) -> Result<String, ResolutionError> {
    let base = require_file_server(file_server_url)?;
    let segments = route_segments(routes, handler, params)?;
    let mut url = parse_absolute("file_server_url", base)?;
    url.path_segments_mut()
        .map_err(|_| ResolutionError::invalid_url("file_server_url", base, "cannot be a base"))?
        .pop_if_empty()
        .extend(&segments);
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair(query_key, destination);
    Ok(url.to_string())
}

/// File-server URL the droplet is uploaded to, relaying to `destination`.
///
/// `destination` must be an absolute URL.
pub fn droplet_upload_url(
    app_id: &str,
    file_server_url: &str,
    destination: &str,
    routes: &FileServerRoutes,
) -> Result<String, ResolutionError> {
    parse_absolute("droplet_upload_uri", destination)?;
    upload_url(
        routes,
        FileServerHandler::UploadDroplet,
        &[("guid", app_id)],
        file_server_url,
        CC_DROPLET_UPLOAD_URI_KEY,
        destination,
    )
}

/// File-server URL the build artifacts cache is uploaded to.
///
/// Unlike the droplet, an empty `destination` is accepted and relayed as an
/// empty query value; the cache upload is best-effort. A non-empty
/// destination must be an absolute URL.
pub fn build_artifacts_upload_url(
    app_id: &str,
    file_server_url: &str,
    destination: &str,
    routes: &FileServerRoutes,
) -> Result<String, ResolutionError> {
    if !destination.is_empty() {
        parse_absolute("build_artifacts_cache_upload_uri", destination)?;
    }
    upload_url(
        routes,
        FileServerHandler::UploadBuildArtifacts,
        &[("app_guid", app_id)],
        file_server_url,
        CC_BUILD_ARTIFACTS_UPLOAD_URI_KEY,
        destination,
    )
}

/// Prior build artifacts cache location; `None` when the caller has none.
pub fn build_artifacts_download_url(
    download_uri: Option<&str>,
) -> Result<Option<String>, ResolutionError> {
    match download_uri {
        None | Some("") => Ok(None),
        Some(uri) => {
            parse_absolute("build_artifacts_cache_download_uri", uri)?;
            Ok(Some(uri.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE_SERVER: &str = "http://file-server.com/";

    fn compilers() -> IndexMap<String, String> {
        IndexMap::from([
            ("rabbit_hole".to_string(), "rabbit-hole-compiler".to_string()),
            (
                "compiler_with_full_url".to_string(),
                "http://the-full-compiler-url".to_string(),
            ),
            (
                "compiler_with_bad_url".to_string(),
                "ftp://the-bad-compiler-url".to_string(),
            ),
        ])
    }

    #[test]
    fn test_resolver_join_url() {
        assert_eq!(
            join_url("http://fs.com/", &["/v1/static/", "compiler"]),
            "http://fs.com/v1/static/compiler"
        );
        assert_eq!(join_url("http://fs.com", &["a", "", "b"]), "http://fs.com/a/b");
    }

    #[test]
    fn test_resolver_compiler_relative() {
        let url = compiler_download_url(
            "rabbit_hole",
            &compilers(),
            FILE_SERVER,
            &FileServerRoutes::default(),
        )
        .unwrap();
        assert_eq!(url, "http://file-server.com/v1/static/rabbit-hole-compiler");
    }

    #[test]
    fn test_resolver_compiler_full_url_unchanged() {
        let url = compiler_download_url(
            "compiler_with_full_url",
            &compilers(),
            FILE_SERVER,
            &FileServerRoutes::default(),
        )
        .unwrap();
        assert_eq!(url, "http://the-full-compiler-url");
    }

    #[test]
    fn test_resolver_compiler_unknown_stack() {
        let err = compiler_download_url(
            "no_such_stack",
            &compilers(),
            FILE_SERVER,
            &FileServerRoutes::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::NoCompilerDefined {
                stack: "no_such_stack".to_string()
            }
        );
    }

    #[test]
    fn test_resolver_compiler_bad_scheme() {
        let err = compiler_download_url(
            "compiler_with_bad_url",
            &compilers(),
            FILE_SERVER,
            &FileServerRoutes::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnsupportedScheme {
                scheme: "ftp".to_string()
            }
        );
    }

    #[test]
    fn test_resolver_compiler_relative_needs_file_server() {
        let err = compiler_download_url(
            "rabbit_hole",
            &compilers(),
            "",
            &FileServerRoutes::default(),
        )
        .unwrap_err();
        assert_eq!(err, ResolutionError::NoFileServer);
    }

    #[test]
    fn test_resolver_compiler_missing_static_route() {
        let err = compiler_download_url(
            "rabbit_hole",
            &compilers(),
            FILE_SERVER,
            &FileServerRoutes::new(vec![]),
        )
        .unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidUrl { field: "route", .. }));
    }

    #[test]
    fn test_resolver_droplet_upload() {
        let url = droplet_upload_url(
            "bunny",
            FILE_SERVER,
            "http://example-uri.com/droplet-upload",
            &FileServerRoutes::default(),
        )
        .unwrap();
        assert_eq!(
            url,
            "http://file-server.com/v1/droplet/bunny?cc-droplet-upload-uri=http%3A%2F%2Fexample-uri.com%2Fdroplet-upload"
        );
    }

    #[test]
    fn test_resolver_build_artifacts_upload() {
        let url = build_artifacts_upload_url(
            "bunny",
            FILE_SERVER,
            "http://example-uri.com/bunny-uppings",
            &FileServerRoutes::default(),
        )
        .unwrap();
        assert_eq!(
            url,
            "http://file-server.com/v1/build_artifacts/bunny?cc-build-artifacts-upload-uri=http%3A%2F%2Fexample-uri.com%2Fbunny-uppings"
        );
    }

    #[test]
    fn test_resolver_upload_malformed_destination() {
        let err = droplet_upload_url("bunny", FILE_SERVER, "not-a-uri", &FileServerRoutes::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::InvalidUrl {
                field: "droplet_upload_uri",
                ..
            }
        ));
    }

    #[test]
    fn test_resolver_upload_encodes_app_id() {
        let routes = FileServerRoutes::default();
        let destination = "http://example-uri.com/droplet-upload";
        let query = "cc-droplet-upload-uri=http%3A%2F%2Fexample-uri.com%2Fdroplet-upload";
        assert_eq!(
            droplet_upload_url("a?b", FILE_SERVER, destination, &routes).unwrap(),
            format!("http://file-server.com/v1/droplet/a%3Fb?{}", query)
        );
        assert_eq!(
            droplet_upload_url("a#b", FILE_SERVER, destination, &routes).unwrap(),
            format!("http://file-server.com/v1/droplet/a%23b?{}", query)
        );
        assert_eq!(
            droplet_upload_url("a/b", FILE_SERVER, destination, &routes).unwrap(),
            format!("http://file-server.com/v1/droplet/a%2Fb?{}", query)
        );
    }

    #[test]
    fn test_resolver_upload_keeps_file_server_prefix() {
        let url = build_artifacts_upload_url(
            "bunny",
            "http://file-server.com/prefix",
            "http://example-uri.com/bunny-uppings",
            &FileServerRoutes::default(),
        )
        .unwrap();
        assert!(url.starts_with("http://file-server.com/prefix/v1/build_artifacts/bunny?"));
    }

    #[test]
    fn test_resolver_build_artifacts_upload_empty_destination() {
        let url = build_artifacts_upload_url("bunny", FILE_SERVER, "", &FileServerRoutes::default())
            .unwrap();
        assert_eq!(
            url,
            "http://file-server.com/v1/build_artifacts/bunny?cc-build-artifacts-upload-uri="
        );
        let err = droplet_upload_url("bunny", FILE_SERVER, "", &FileServerRoutes::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::InvalidUrl {
                field: "droplet_upload_uri",
                ..
            }
        ));
    }

    #[test]
    fn test_resolver_artifacts_download() {
        assert_eq!(build_artifacts_download_url(None).unwrap(), None);
        assert_eq!(build_artifacts_download_url(Some("")).unwrap(), None);
        assert_eq!(
            build_artifacts_download_url(Some("http://example-uri.com/bunny-droppings")).unwrap(),
            Some("http://example-uri.com/bunny-droppings".to_string())
        );
        let err = build_artifacts_download_url(Some("not-a-uri")).unwrap_err();
        assert!(err.to_string().contains("invalid URI"));
    }
}

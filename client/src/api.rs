//! DummyJSON endpoints.
//!
//! [`StorefrontApi`] binds every screen's network call to its schema. Reads
//! go through a shared [`QueryClient`], so identical concurrent reads cost one
//! request. Writes are [`Mutation`]s whose pending flag a UI can watch.

use crate::config::ClientConfig;
use crate::forms::{ProfileForm, ProfileUpdate, RegisterForm, RegisterPayload};
use crate::providers::{Authenticator, PageRequest, PostFetcher};
use crate::schemas::{
    CommentsPage, CreatedComment, CreatedPost, LoginRequest, LoginResponse, NewComment, NewPost,
    Post, PostsPage, Product, ProductsPage, ReactedPost, Reactions, ReactionsUpdate, UserDetail,
    UserSummary,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use storefront_remote::{
    HttpMethod, HttpRequest, HttpTransport, JsonSchema, Mutation, Query, QueryClient, QueryConfig,
    QueryKey, QueryParams, RemoteError, Result, send_json,
};

fn json_body<V: Serialize>(vars: &V) -> std::result::Result<Value, String> {
    serde_json::to_value(vars).map_err(|e| e.to_string())
}

/// A mutation that sends the request built from its variables through `transport`.
///
/// The server's message becomes the mutation error message.
fn json_mutation<H, V, T, B>(
    transport: &Arc<H>,
    name: &str,
    schema: JsonSchema<T>,
    build: B,
) -> Mutation<V, T>
where
    H: HttpTransport + 'static,
    V: Send + 'static,
    T: DeserializeOwned + 'static,
    B: Fn(V) -> std::result::Result<HttpRequest, String> + Send + Sync + 'static,
{
    let transport = Arc::clone(transport);
    Mutation::new(name, schema, move |vars: V| {
        let transport = Arc::clone(&transport);
        let request = build(vars);
        async move {
            let request = request?;
            send_json(transport.as_ref(), request)
                .await
                .map_err(|e| e.message().to_string())
        }
    })
}

/// Typed access to the DummyJSON API.
///
/// Cloning is cheap; clones share the transport, the in-flight read table
/// and the mutation pending flags.
pub struct StorefrontApi<H> {
    client: QueryClient<H>,
    config: Arc<ClientConfig>,
    login: Mutation<LoginRequest, LoginResponse>,
    register: Mutation<RegisterPayload, UserSummary>,
    create_post: Mutation<NewPost, CreatedPost>,
    add_comment: Mutation<NewComment, CreatedComment>,
    update_likes: Mutation<(u64, Reactions), ReactedPost>,
    update_profile: Mutation<(u64, ProfileUpdate), UserSummary>,
}

impl<H> Clone for StorefrontApi<H> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            login: self.login.clone(),
            register: self.register.clone(),
            create_post: self.create_post.clone(),
            add_comment: self.add_comment.clone(),
            update_likes: self.update_likes.clone(),
            update_profile: self.update_profile.clone(),
        }
    }
}

impl<H: HttpTransport + 'static> StorefrontApi<H> {
    /// Create the API over `transport`.
    #[must_use]
    pub fn new(transport: H, config: ClientConfig) -> Self {
        let transport = Arc::new(transport);
        let base = config.api_base_url.clone();

        let url = base.clone();
        let login = json_mutation(&transport, "login", LoginResponse::schema(), move |vars| {
            Ok(HttpRequest::post(format!("{url}/auth/login")).with_json(json_body(&vars)?))
        });

        let url = base.clone();
        let register = json_mutation(&transport, "register", UserSummary::schema(), move |vars| {
            Ok(HttpRequest::post(format!("{url}/users/add")).with_json(json_body(&vars)?))
        });

        let url = base.clone();
        let create_post = json_mutation(&transport, "create_post", CreatedPost::schema(), move |vars| {
            Ok(HttpRequest::post(format!("{url}/posts/add")).with_json(json_body(&vars)?))
        });

        let url = base.clone();
        let add_comment = json_mutation(&transport, "add_comment", CreatedComment::schema(), move |vars| {
            Ok(HttpRequest::post(format!("{url}/comments/add")).with_json(json_body(&vars)?))
        });

        let url = base.clone();
        let update_likes = json_mutation(
            &transport,
            "update_post_likes",
            ReactedPost::schema(),
            move |(id, reactions): (u64, Reactions)| {
                let body = json_body(&ReactionsUpdate { reactions })?;
                Ok(HttpRequest::new(HttpMethod::Put, format!("{url}/posts/{id}")).with_json(body))
            },
        );

        let url = base;
        let update_profile = json_mutation(
            &transport,
            "update_profile",
            UserSummary::schema(),
            move |(id, update): (u64, ProfileUpdate)| {
                Ok(HttpRequest::put(format!("{url}/users/{id}")).with_json(json_body(&update)?))
            },
        );

        Self {
            client: QueryClient::from_arc(transport),
            config: Arc::new(config),
            login,
            register,
            create_post,
            add_comment,
            update_likes,
            update_profile,
        }
    }

    /// The configuration endpoints are built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared read client.
    #[must_use]
    pub const fn query_client(&self) -> &QueryClient<H> {
        &self.client
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &H {
        self.client.transport()
    }

    async fn read<T>(&self, key: &str, path: &str, schema: JsonSchema<T>, params: QueryParams) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let config = QueryConfig::new().with_params(params);
        self.client
            .fetch(&QueryKey::new(key), &self.config.url(path), &schema, &config)
            .await
    }

    /// One feed page; `search` switches to `/posts/search`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport or validation failure.
    pub async fn posts_page(&self, page: u32, search: Option<&str>) -> Result<PostsPage> {
        let request = PageRequest {
            page: page.max(1),
            limit: self.config.page_size,
            search: search.map(str::to_string),
        };
        self.fetch_page(&request).await
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<PostsPage> {
        let mut params = QueryParams::new()
            .with("limit", request.limit)
            .with("skip", request.skip());
        let path = match request.search.as_deref() {
            Some(term) if !term.trim().is_empty() => {
                params.insert("q", term.trim());
                "/posts/search"
            },
            _ => "/posts",
        };
        self.read("posts", path, PostsPage::schema(), params).await
    }

    /// A single post.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport or validation failure.
    pub async fn post_detail(&self, id: u64) -> Result<Post> {
        self.read("post", &format!("/posts/{id}"), Post::schema(), QueryParams::new())
            .await
    }

    /// Comments of a post.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport or validation failure.
    pub async fn post_comments(&self, post_id: u64) -> Result<CommentsPage> {
        self.read(
            "comments",
            &format!("/comments/post/{post_id}"),
            CommentsPage::schema(),
            QueryParams::new(),
        )
        .await
    }

    /// One page of the marketplace.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport or validation failure.
    pub async fn products_page(&self, skip: u32, limit: u32) -> Result<ProductsPage> {
        let params = QueryParams::new().with("limit", limit).with("skip", skip);
        self.read("products", "/products", ProductsPage::schema(), params).await
    }

    /// Stateful handle over one marketplace page.
    #[must_use]
    pub fn products_query(&self, skip: u32, limit: u32) -> Query<ProductsPage, JsonSchema<ProductsPage>, H> {
        let params = QueryParams::new().with("limit", limit).with("skip", skip);
        Query::new(
            self.client.clone(),
            QueryKey::new("products"),
            self.config.url("/products"),
            ProductsPage::schema(),
            QueryConfig::new().with_params(params),
        )
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport or validation failure.
    pub async fn product_detail(&self, id: u64) -> Result<Product> {
        self.read("product", &format!("/products/{id}"), Product::schema(), QueryParams::new())
            .await
    }

    /// A full user record.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport or validation failure.
    pub async fn user_detail(&self, id: u64) -> Result<UserDetail> {
        self.read("user", &format!("/users/{id}"), UserDetail::schema(), QueryParams::new())
            .await
    }

    /// The login write, for observing its pending flag.
    #[must_use]
    pub const fn login_mutation(&self) -> &Mutation<LoginRequest, LoginResponse> {
        &self.login
    }

    /// Exchange credentials for tokens.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Mutation`] with the server's message when the
    /// login is rejected.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        self.login.mutate(request).await
    }

    /// Create an account from a registration form.
    ///
    /// An invalid form fails with [`RemoteError::Validation`] and sends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on form, transport or validation failure.
    pub async fn register(&self, form: &RegisterForm) -> Result<UserSummary> {
        form.validate().map_err(RemoteError::validation)?;
        self.register.mutate(form.payload()).await
    }

    /// Publish a post.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport or validation failure.
    pub async fn create_post(&self, post: NewPost) -> Result<CreatedPost> {
        self.create_post.mutate(post).await
    }

    /// Comment on a post.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport or validation failure.
    pub async fn add_comment(&self, comment: NewComment) -> Result<CreatedComment> {
        self.add_comment.mutate(comment).await
    }

    /// Store new reaction counters on a post.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport or validation failure.
    pub async fn update_post_likes(&self, post_id: u64, reactions: Reactions) -> Result<ReactedPost> {
        self.update_likes.mutate((post_id, reactions)).await
    }

    /// Save a profile form.
    ///
    /// An invalid form fails with [`RemoteError::Validation`] and sends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on form, transport or validation failure.
    pub async fn update_profile(&self, user_id: u64, form: &ProfileForm) -> Result<UserSummary> {
        form.validate().map_err(RemoteError::validation)?;
        self.update_profile.mutate((user_id, form.payload())).await
    }
}

impl<H: HttpTransport + 'static> PostFetcher for StorefrontApi<H> {
    async fn fetch_posts(&self, request: PageRequest) -> Result<PostsPage> {
        self.fetch_page(&request).await
    }
}

impl<H: HttpTransport + 'static> Authenticator for StorefrontApi<H> {
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        self.login.mutate(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::product::tests::mascara_json;
    use crate::schemas::user::tests::emily_json;
    use serde_json::json;
    use storefront_remote::MockTransport;

    const BASE: &str = "https://dummyjson.com";

    fn api(transport: &MockTransport) -> StorefrontApi<MockTransport> {
        StorefrontApi::new(transport.clone(), ClientConfig::new().with_api_base_url(BASE))
    }

    fn posts_body(ids: &[u64], total: u32) -> Value {
        let posts: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "id": id, "title": format!("Post {id}"), "body": "...", "tags": [],
                    "reactions": {"likes": 0, "dislikes": 0}, "views": 1, "userId": 7
                })
            })
            .collect();
        json!({"posts": posts, "total": total, "skip": 0, "limit": 20})
    }

    #[tokio::test]
    async fn test_posts_page_parameters() {
        let transport = MockTransport::new().on_get("/posts", 200, posts_body(&[21, 22], 30));
        let page = api(&transport).posts_page(2, None).await.unwrap();

        assert_eq!(page.posts.len(), 2);
        let request = transport.last_request().unwrap();
        assert_eq!(request.query_value("limit"), Some("20"));
        assert_eq!(request.query_value("skip"), Some("20"));
        assert_eq!(request.query_value("q"), None);
    }

    #[tokio::test]
    async fn test_search_uses_search_endpoint() {
        let transport = MockTransport::new().on_get("/posts/search", 200, posts_body(&[3], 1));
        api(&transport).posts_page(1, Some(" love ")).await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.path(), "/posts/search");
        assert_eq!(request.query_value("q"), Some("love"));
        assert_eq!(request.query_value("skip"), Some("0"));
    }

    #[tokio::test]
    async fn test_detail_reads() {
        let transport = MockTransport::new()
            .on_get("/products/1", 200, mascara_json())
            .on_get("/users/1", 200, emily_json());
        let api = api(&transport);

        assert_eq!(api.product_detail(1).await.unwrap().title, "Essence Mascara Lash Princess");
        assert_eq!(api.user_detail(1).await.unwrap().username, "emilys");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_products_query_handle() {
        let transport = MockTransport::new().on_get(
            "/products",
            200,
            json!({"products": [mascara_json()], "total": 194, "skip": 0, "limit": 10}),
        );
        let query = api(&transport).products_query(0, 10);

        let result = query.fetch().await;
        assert!(result.is_success());
        assert_eq!(result.data.unwrap().total, 194);
        assert_eq!(transport.last_request().unwrap().query_value("limit"), Some("10"));
    }

    #[tokio::test]
    async fn test_login_rejection_carries_server_message() {
        let transport = MockTransport::new().on_post(
            "/auth/login",
            400,
            json!({"message": "Invalid credentials"}),
        );
        let error = api(&transport)
            .login(LoginRequest {
                username: "emilys".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(error, RemoteError::mutation("Invalid credentials"));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_registration_sends_nothing() {
        let transport = MockTransport::new();
        let error = api(&transport).register(&RegisterForm::default()).await.unwrap_err();

        assert!(error.is_validation());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_like_update_puts_reactions() {
        let transport = MockTransport::new().on_put(
            "/posts/5",
            200,
            json!({"id": 5, "title": "t", "reactions": {"likes": 11, "dislikes": 2}}),
        );
        let updated = api(&transport)
            .update_post_likes(5, Reactions { likes: 11, dislikes: 2 })
            .await
            .unwrap();

        assert_eq!(updated.reactions.likes, 11);
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.body, Some(json!({"reactions": {"likes": 11, "dislikes": 2}})));
    }

    #[tokio::test]
    async fn test_add_comment_body() {
        let transport = MockTransport::new().on_post(
            "/comments/add",
            201,
            json!({"id": 341, "body": "Nice", "postId": 6, "user": {"id": 1, "username": "emilys"}}),
        );
        let created = api(&transport)
            .add_comment(NewComment {
                body: "Nice".to_string(),
                post_id: 6,
                user_id: 1,
            })
            .await
            .unwrap();

        assert_eq!(created.likes, 0);
        assert_eq!(
            transport.last_request().unwrap().body,
            Some(json!({"body": "Nice", "postId": 6, "userId": 1}))
        );
    }
}

mod common;

use chrono::Duration;
use clubgrid::{
    domain::{CreateInviteRequest, InviteState, RedeemInviteRequest, Role},
    error::AppError,
    mail::NotificationOutcome,
};
use common::{file_pool, setup, setup_on, BASE_URL};

fn invite_request(name: &str, email: Option<&str>, role: Option<Role>) -> CreateInviteRequest {
    CreateInviteRequest {
        full_name: name.to_string(),
        email: email.map(str::to_string),
        role,
    }
}

fn redeem_request(email: &str) -> RedeemInviteRequest {
    RedeemInviteRequest {
        full_name: "Max Mustermann".to_string(),
        email: email.to_string(),
        password: "super-secret".to_string(),
    }
}

#[tokio::test]
async fn test_happy_path_invite() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let invites = &ctx.services.invite_service;

    let issued = invites
        .create(Some(&admin), invite_request("Max Mustermann", None, Some(Role::Coach)))
        .await?;
    let token = issued.invite.token.clone();

    assert_eq!(token.len(), 64);
    assert_eq!(issued.acceptance_url, format!("{}/invite/{}", BASE_URL, token));
    assert_eq!(issued.invite.club_id, club.id);
    assert_eq!(issued.invite.created_by, admin.id);
    assert_eq!(issued.invite.expires_at, ctx.clock_now() + Duration::days(7));
    assert_eq!(issued.notification, NotificationOutcome::NotRequested);

    let public = invites.get_by_token(&token).await?;
    assert_eq!(public.role, Role::Coach);
    assert_eq!(public.club.id, club.id);
    assert_eq!(public.club.name, "FC Example");

    let redeemed = invites
        .redeem(None, &token, redeem_request("Max@Example.com"))
        .await?;
    assert_eq!(redeemed.membership.club_id, Some(club.id));
    assert_eq!(redeemed.membership.role, Role::Coach);
    assert_eq!(redeemed.identity.email, "max@example.com");
    assert_eq!(redeemed.redirect_to, "/coach");

    let signed_in = ctx
        .services
        .auth_service
        .current_identity(&redeemed.session_token)
        .await?;
    assert_eq!(signed_in.map(|i| i.id), Some(redeemed.identity.id));

    assert!(matches!(
        invites.get_by_token(&token).await,
        Err(AppError::NotFoundOrExpired)
    ));

    let detail = invites.get(Some(&admin), issued.invite.id).await?;
    assert_eq!(detail.state, InviteState::Used);
    Ok(())
}

#[tokio::test]
async fn test_role_defaults_to_player() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let coach = ctx.member(&club, Role::Coach, "coach@example.com").await;

    let issued = ctx
        .services
        .invite_service
        .create(Some(&coach), invite_request("New Player", Some(""), None))
        .await?;

    assert_eq!(issued.invite.role, Role::Player);
    assert_eq!(issued.invite.email, None);
    Ok(())
}

#[tokio::test]
async fn test_players_cannot_invite_and_names_are_required() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let player = ctx.member(&club, Role::Player, "player@example.com").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let invites = &ctx.services.invite_service;

    assert!(matches!(
        invites.create(Some(&player), invite_request("Someone", None, None)).await,
        Err(AppError::Unauthorized)
    ));
    assert!(matches!(
        invites.create(None, invite_request("Someone", None, None)).await,
        Err(AppError::Unauthenticated)
    ));
    assert!(matches!(
        invites.create(Some(&admin), invite_request("   ", None, None)).await,
        Err(AppError::Validation(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_expiry_boundary() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let invites = &ctx.services.invite_service;

    let issued = invites
        .create(Some(&admin), invite_request("Late Comer", None, None))
        .await?;
    let token = issued.invite.token;

    ctx.clock.advance(Duration::days(7) - Duration::seconds(1));
    assert!(invites.get_by_token(&token).await.is_ok());

    ctx.clock.advance(Duration::seconds(1));
    assert!(matches!(
        invites.get_by_token(&token).await,
        Err(AppError::NotFoundOrExpired)
    ));
    assert!(matches!(
        invites.redeem(None, &token, redeem_request("late@example.com")).await,
        Err(AppError::InvalidOrExpiredInvite)
    ));
    Ok(())
}

#[tokio::test]
async fn test_expired_then_resent() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let invites = &ctx.services.invite_service;
    let t0 = ctx.clock_now();

    let issued = invites
        .create(
            Some(&admin),
            invite_request("Erika Musterfrau", Some("erika@example.com"), Some(Role::Coach)),
        )
        .await?;
    let original = issued.invite.clone();

    ctx.clock.advance(Duration::days(8));
    assert!(matches!(
        invites.get_by_token(&original.token).await,
        Err(AppError::NotFoundOrExpired)
    ));
    assert_eq!(
        invites.get(Some(&admin), original.id).await?.state,
        InviteState::Expired
    );

    let resent = invites.resend(Some(&admin), original.id).await?;
    let rotated = &resent.invite;
    assert_ne!(rotated.token, original.token);
    assert_eq!(rotated.expires_at, t0 + Duration::days(15));
    assert_eq!(rotated.role, original.role);
    assert_eq!(rotated.club_id, original.club_id);
    assert_eq!(rotated.full_name, original.full_name);
    assert_eq!(rotated.email, original.email);
    assert_eq!(rotated.used_at, None);
    assert_eq!(rotated.resend_count, 1);
    assert_eq!(resent.acceptance_url, format!("{}/invite/{}", BASE_URL, rotated.token));

    // The old token stays dead.
    assert!(invites.get_by_token(&original.token).await.is_err());

    ctx.clock.advance(Duration::days(1));
    let public = invites.get_by_token(&rotated.token).await?;
    assert_eq!(public.full_name, "Erika Musterfrau");
    assert_eq!(public.role, Role::Coach);

    // Created and resent, both mailed.
    assert_eq!(ctx.mailer.sent().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_resend_never_reuses_a_token() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let coach = ctx.member(&club, Role::Coach, "coach@example.com").await;
    let invites = &ctx.services.invite_service;

    let issued = invites
        .create(Some(&coach), invite_request("Repeat", None, None))
        .await?;

    let mut seen = vec![issued.invite.token.clone()];
    for _ in 0..5 {
        let resent = invites.resend(Some(&coach), issued.invite.id).await?;
        assert!(!seen.contains(&resent.invite.token));
        seen.push(resent.invite.token);
    }
    Ok(())
}

#[tokio::test]
async fn test_used_invite_cannot_be_resent() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let invites = &ctx.services.invite_service;

    let issued = invites
        .create(Some(&admin), invite_request("Once", None, None))
        .await?;
    invites
        .redeem(None, &issued.invite.token, redeem_request("once@example.com"))
        .await?;

    assert!(matches!(
        invites.resend(Some(&admin), issued.invite.id).await,
        Err(AppError::AlreadyUsed)
    ));

    // Deletion still works on a used invite.
    invites.delete(Some(&admin), issued.invite.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_coach_cannot_delete_invite() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let other_club = ctx.create_club("Rivals").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let coach = ctx.member(&club, Role::Coach, "coach@example.com").await;
    let other_admin = ctx.member(&other_club, Role::Admin, "admin@rivals.com").await;
    let invites = &ctx.services.invite_service;

    let own = invites
        .create(Some(&admin), invite_request("Own", None, None))
        .await?;
    let foreign = invites
        .create(Some(&other_admin), invite_request("Foreign", None, None))
        .await?;

    for id in [own.invite.id, foreign.invite.id, uuid::Uuid::new_v4()] {
        assert!(matches!(
            invites.delete(Some(&coach), id).await,
            Err(AppError::Unauthorized)
        ));
    }

    // Admins can, but only in their own club.
    assert!(matches!(
        invites.delete(Some(&admin), foreign.invite.id).await,
        Err(AppError::Unauthorized)
    ));
    invites.delete(Some(&admin), own.invite.id).await?;
    assert!(matches!(
        invites.get(Some(&admin), own.invite.id).await,
        Err(AppError::Unauthorized)
    ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_redemption_has_one_winner() -> anyhow::Result<()> {
    let ctx = setup_on(file_pool(8).await, |_| {}).await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;

    let issued = ctx
        .services
        .invite_service
        .create(Some(&admin), invite_request("Racer", None, None))
        .await?;

    let mut handles = Vec::new();
    for i in 0..8 {
        let services = ctx.services.clone();
        let token = issued.invite.token.clone();
        handles.push(tokio::spawn(async move {
            services
                .invite_service
                .redeem(None, &token, redeem_request(&format!("racer{}@example.com", i)))
                .await
        }));
    }

    let mut successes = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => successes += 1,
            Err(AppError::InvalidOrExpiredInvite) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(rejected, 7);

    let identities: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM identities WHERE email LIKE 'racer%'")
        .fetch_one(&ctx.pool)
        .await?;
    assert_eq!(identities, 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_registration_does_not_burn_invite() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let invites = &ctx.services.invite_service;

    let issued = invites
        .create(Some(&admin), invite_request("Taken", None, None))
        .await?;

    assert!(matches!(
        invites
            .redeem(None, &issued.invite.token, redeem_request("ADMIN@example.com"))
            .await,
        Err(AppError::IdentityAlreadyExists)
    ));

    // Still pending: the claim was rolled back with the failed sign-up.
    assert!(invites.get_by_token(&issued.invite.token).await.is_ok());
    invites
        .redeem(None, &issued.invite.token, redeem_request("fresh@example.com"))
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_redemption_ends_existing_session() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let auth = &ctx.services.auth_service;

    let admin_session = auth.create_session(admin.id).await?;
    let issued = ctx
        .services
        .invite_service
        .create(Some(&admin), invite_request("Newcomer", None, None))
        .await?;

    let redeemed = ctx
        .services
        .invite_service
        .redeem(Some(&admin_session), &issued.invite.token, redeem_request("new@example.com"))
        .await?;

    assert!(auth.current_identity(&admin_session).await?.is_none());
    assert_ne!(redeemed.identity.id, admin.id);
    Ok(())
}

#[tokio::test]
async fn test_mail_failure_is_soft() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    ctx.mailer.set_failing(true);

    let issued = ctx
        .services
        .invite_service
        .create(Some(&admin), invite_request("Unlucky", Some("unlucky@example.com"), None))
        .await?;

    assert!(issued.notification.warning().is_some());
    assert!(ctx.services.invite_service.get_by_token(&issued.invite.token).await.is_ok());

    ctx.mailer.set_failing(false);
    let resent = ctx
        .services
        .invite_service
        .resend(Some(&admin), issued.invite.id)
        .await?;
    assert!(matches!(resent.notification, NotificationOutcome::Sent { .. }));

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "unlucky@example.com");
    assert_eq!(sent[0].subject, "Invitation to join FC Example");
    assert!(sent[0].text_body.contains(&resent.acceptance_url));
    Ok(())
}

#[tokio::test]
async fn test_invite_list_is_club_scoped() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let other_club = ctx.create_club("Rivals").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let other_admin = ctx.member(&other_club, Role::Admin, "admin@rivals.com").await;
    let invites = &ctx.services.invite_service;

    invites.create(Some(&admin), invite_request("Mine", None, None)).await?;
    let foreign = invites
        .create(Some(&other_admin), invite_request("Theirs", None, None))
        .await?;

    let listed = invites.list(Some(&admin)).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].invite.full_name, "Mine");
    assert_eq!(listed[0].state, InviteState::Pending);

    assert!(matches!(
        invites.resend(Some(&admin), foreign.invite.id).await,
        Err(AppError::Unauthorized)
    ));
    Ok(())
}

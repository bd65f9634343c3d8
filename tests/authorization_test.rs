mod common;

use clubgrid::{
    auth::guard::{ANY_MEMBER, STAFF},
    domain::{Role, TeamAssignment, TeamRequest, UpdateClubRequest},
    error::AppError,
};
use common::setup;

#[tokio::test]
async fn test_tenant_isolation_for_every_role() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let other_club = ctx.create_club("Rivals").await;
    let guard = &ctx.services.guard;

    for (i, role) in Role::ALL.into_iter().enumerate() {
        let identity = ctx.member(&club, role, &format!("member{}@example.com", i)).await;

        assert!(matches!(
            guard.authorize(Some(&identity), ANY_MEMBER, Some(other_club.id)).await,
            Err(AppError::Unauthorized)
        ));

        let actor = guard.authorize(Some(&identity), ANY_MEMBER, Some(club.id)).await?;
        assert_eq!(actor.club_id, club.id);
        assert_eq!(actor.role, role);
    }
    Ok(())
}

#[tokio::test]
async fn test_unauthenticated_callers() -> anyhow::Result<()> {
    let ctx = setup().await;
    let guard = &ctx.services.guard;

    assert!(matches!(
        guard.authorize(None, ANY_MEMBER, None).await,
        Err(AppError::Unauthenticated)
    ));

    // An identity whose membership row is gone counts as not onboarded.
    let (identity, _) = ctx
        .services
        .auth_service
        .sign_up("ghost@example.com", "correct-horse", "Ghost")
        .await?;
    sqlx::query("DELETE FROM profiles WHERE id = ?")
        .bind(identity.id.to_string())
        .execute(&ctx.pool)
        .await?;

    assert!(matches!(
        guard.authorize(Some(&identity), ANY_MEMBER, None).await,
        Err(AppError::Unauthenticated)
    ));
    Ok(())
}

#[tokio::test]
async fn test_member_without_club_is_unauthorized() -> anyhow::Result<()> {
    let ctx = setup().await;
    let (identity, membership) = ctx
        .services
        .auth_service
        .sign_up("drifter@example.com", "correct-horse", "Drifter")
        .await?;
    assert_eq!(membership.club_id, None);

    assert!(matches!(
        ctx.services.guard.authorize(Some(&identity), ANY_MEMBER, None).await,
        Err(AppError::Unauthorized)
    ));

    // Can still see who they are.
    let me = ctx.services.member_service.me(Some(&identity)).await?;
    assert_eq!(me.membership.id, identity.id);
    assert!(me.club.is_none());
    Ok(())
}

#[tokio::test]
async fn test_role_change_takes_effect_immediately() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let coach = ctx.member(&club, Role::Coach, "coach@example.com").await;
    let guard = &ctx.services.guard;

    guard.authorize(Some(&coach), STAFF, None).await?;

    ctx.services
        .member_service
        .update_role(Some(&admin), coach.id, Role::Player)
        .await?;

    assert!(matches!(
        guard.authorize(Some(&coach), STAFF, None).await,
        Err(AppError::Unauthorized)
    ));
    Ok(())
}

#[tokio::test]
async fn test_self_action_guard() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let members = &ctx.services.member_service;

    for role in Role::ALL {
        assert!(matches!(
            members.update_role(Some(&admin), admin.id, role).await,
            Err(AppError::SelfActionForbidden)
        ));
    }
    assert!(matches!(
        members.remove(Some(&admin), admin.id).await,
        Err(AppError::SelfActionForbidden)
    ));
    assert!(matches!(
        members
            .assign_to_team(
                Some(&admin),
                admin.id,
                TeamAssignment { team_id: None, position: None },
            )
            .await,
        Err(AppError::SelfActionForbidden)
    ));
    Ok(())
}

#[tokio::test]
async fn test_member_management_across_clubs() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let other_club = ctx.create_club("Rivals").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let coach = ctx.member(&club, Role::Coach, "coach@example.com").await;
    let outsider = ctx.member(&other_club, Role::Player, "player@rivals.com").await;
    let members = &ctx.services.member_service;

    assert!(matches!(
        members.update_role(Some(&admin), outsider.id, Role::Coach).await,
        Err(AppError::Unauthorized)
    ));
    assert!(matches!(
        members.remove(Some(&admin), outsider.id).await,
        Err(AppError::Unauthorized)
    ));
    // Coaches may not change roles.
    assert!(matches!(
        members.update_role(Some(&coach), admin.id, Role::Player).await,
        Err(AppError::Unauthorized)
    ));

    let listed = members.list(Some(&coach)).await?;
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|m| m.id != outsider.id));
    Ok(())
}

#[tokio::test]
async fn test_remove_member_detaches_from_club() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let coach = ctx.member(&club, Role::Coach, "coach@example.com").await;

    let team = ctx
        .services
        .team_service
        .create(Some(&admin), TeamRequest { name: "First Team".to_string(), league: None })
        .await?;
    ctx.services
        .member_service
        .assign_to_team(
            Some(&admin),
            coach.id,
            TeamAssignment { team_id: Some(team.id), position: Some("Head coach".to_string()) },
        )
        .await?;

    ctx.services.member_service.remove(Some(&admin), coach.id).await?;

    let me = ctx.services.member_service.me(Some(&coach)).await?;
    assert_eq!(me.membership.club_id, None);
    assert_eq!(me.membership.role, Role::Player);

    let teams = ctx.services.team_service.list(Some(&admin)).await?;
    assert_eq!(teams[0].member_count, 0);

    assert!(matches!(
        ctx.services.team_service.list(Some(&coach)).await,
        Err(AppError::Unauthorized)
    ));
    Ok(())
}

#[tokio::test]
async fn test_club_settings_require_own_club() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let other_club = ctx.create_club("Rivals").await;
    let admin = ctx.member(&club, Role::Admin, "admin@example.com").await;
    let clubs = &ctx.services.club_service;

    let request = |club_id, color: &str| UpdateClubRequest {
        club_id,
        name: "FC Renamed".to_string(),
        description: Some("Since 1904".to_string()),
        primary_color: Some(color.to_string()),
    };

    assert!(matches!(
        clubs.update_settings(Some(&admin), request(other_club.id, "#fff")).await,
        Err(AppError::Unauthorized)
    ));
    assert!(matches!(
        clubs.update_settings(Some(&admin), request(club.id, "red")).await,
        Err(AppError::Validation(_))
    ));

    let updated = clubs.update_settings(Some(&admin), request(club.id, "#A1B2C3")).await?;
    assert_eq!(updated.name, "FC Renamed");
    assert_eq!(updated.primary_color.as_deref(), Some("#A1B2C3"));
    assert_eq!(clubs.get(Some(&admin)).await?.name, "FC Renamed");
    Ok(())
}

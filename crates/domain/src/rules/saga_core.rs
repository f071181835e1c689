//! Built-in core rules content: five base classes, three prestige classes
//! and a starter catalog of feats, talents, skills and Force powers.

use super::catalog::RuleCatalog;
use crate::entities::{
    ClassDefinition, ClassKind, FeatDefinition, ForcePowerDefinition, Prerequisite,
    PrestigeRequirements, SkillDefinition, TalentDefinition, FORCE_TRAINING_TAG,
    SKILL_TRAINING_TAG,
};
use crate::error::ConfigurationError;
use crate::value_objects::{
    Ability, ClassId, DefenseSet, FeatId, ForcePowerId, SkillId, SpecialRuleId, TalentId,
    TalentTreeId,
};

/// Levels in every base class table.
const BASE_CLASS_LEVELS: u32 = 20;
/// Levels in every prestige class table.
const PRESTIGE_CLASS_LEVELS: u32 = 10;

type Built<T> = Result<T, ConfigurationError>;

fn feat(id: &str, name: &str) -> Built<FeatDefinition> {
    Ok(FeatDefinition::new(FeatId::new(id)?, name))
}

fn talent(id: &str, name: &str, tree: &str) -> Built<TalentDefinition> {
    Ok(TalentDefinition::new(
        TalentId::new(id)?,
        name,
        TalentTreeId::new(tree)?,
    ))
}

fn power(id: &str, name: &str) -> Built<ForcePowerDefinition> {
    Ok(ForcePowerDefinition::new(ForcePowerId::new(id)?, name))
}

fn skill(id: &str, name: &str, ability: Ability) -> Built<SkillDefinition> {
    Ok(SkillDefinition::new(SkillId::new(id)?, name, ability))
}

fn feat_ids(ids: &[&str]) -> Built<Vec<FeatId>> {
    ids.iter()
        .map(|id| FeatId::new(*id).map_err(ConfigurationError::from))
        .collect()
}

fn skill_ids(ids: &[&str]) -> Built<Vec<SkillId>> {
    ids.iter()
        .map(|id| SkillId::new(*id).map_err(ConfigurationError::from))
        .collect()
}

fn tree_ids(ids: &[&str]) -> Built<Vec<TalentTreeId>> {
    ids.iter()
        .map(|id| TalentTreeId::new(*id).map_err(ConfigurationError::from))
        .collect()
}

const JEDI_SKILLS: &[&str] = &[
    "acrobatics",
    "endurance",
    "initiative",
    "jump",
    "knowledge_galactic_lore",
    "mechanics",
    "perception",
    "pilot",
    "use_the_force",
];

/// The core catalog.
///
/// # Errors
///
/// Only if the built-in content is itself inconsistent.
pub fn core_catalog() -> Result<RuleCatalog, ConfigurationError> {
    let mut builder = RuleCatalog::builder();

    for entry in skills()? {
        builder = builder.skill(entry);
    }
    for entry in feats()? {
        builder = builder.feat(entry);
    }
    for entry in talents()? {
        builder = builder.talent(entry);
    }
    for entry in force_powers()? {
        builder = builder.force_power(entry);
    }
    for entry in base_classes()?.into_iter().chain(prestige_classes()?) {
        builder = builder.class(entry);
    }
    builder.build()
}

fn skills() -> Built<Vec<SkillDefinition>> {
    Ok(vec![
        skill("acrobatics", "Acrobatics", Ability::Dex)?,
        skill("climb", "Climb", Ability::Str)?,
        skill("deception", "Deception", Ability::Cha)?,
        skill("endurance", "Endurance", Ability::Con)?,
        skill("gather_information", "Gather Information", Ability::Cha)?,
        skill("initiative", "Initiative", Ability::Dex)?,
        skill("jump", "Jump", Ability::Str)?,
        skill("knowledge_galactic_lore", "Knowledge (Galactic Lore)", Ability::Int)?,
        skill("mechanics", "Mechanics", Ability::Int)?,
        skill("perception", "Perception", Ability::Wis)?,
        skill("persuasion", "Persuasion", Ability::Cha)?,
        skill("pilot", "Pilot", Ability::Dex)?,
        skill("stealth", "Stealth", Ability::Dex)?,
        skill("survival", "Survival", Ability::Wis)?,
        skill("treat_injury", "Treat Injury", Ability::Wis)?,
        skill("use_computer", "Use Computer", Ability::Int)?,
        skill("use_the_force", "Use the Force", Ability::Cha)?,
    ])
}

fn feats() -> Built<Vec<FeatDefinition>> {
    Ok(vec![
        feat("armor_proficiency_light", "Armor Proficiency (Light)")?,
        feat("armor_proficiency_medium", "Armor Proficiency (Medium)")?.with_prerequisite(
            Prerequisite::has_feat(FeatId::new("armor_proficiency_light")?),
        ),
        feat("armor_proficiency_heavy", "Armor Proficiency (Heavy)")?.with_prerequisite(
            Prerequisite::has_feat(FeatId::new("armor_proficiency_medium")?),
        ),
        feat("weapon_proficiency_simple", "Weapon Proficiency (Simple Weapons)")?,
        feat("weapon_proficiency_pistols", "Weapon Proficiency (Pistols)")?,
        feat("weapon_proficiency_rifles", "Weapon Proficiency (Rifles)")?,
        feat("weapon_proficiency_lightsabers", "Weapon Proficiency (Lightsabers)")?,
        feat("weapon_focus_lightsabers", "Weapon Focus (Lightsabers)")?.with_prerequisite(
            Prerequisite::has_feat(FeatId::new("weapon_proficiency_lightsabers")?),
        ),
        feat("force_sensitivity", "Force Sensitivity")?,
        feat("force_training", "Force Training")?
            .with_prerequisite(Prerequisite::special(SpecialRuleId::new("force_sensitive")?))
            .with_prerequisite(Prerequisite::trained(SkillId::new("use_the_force")?))
            .with_tag(FORCE_TRAINING_TAG),
        feat("force_boon", "Force Boon")?
            .with_prerequisite(Prerequisite::special(SpecialRuleId::new("force_sensitive")?)),
        feat("skill_training", "Skill Training")?.with_tag(SKILL_TRAINING_TAG),
        feat("skill_focus", "Skill Focus")?,
        feat("linguist", "Linguist")?.with_prerequisite(Prerequisite::min_ability(Ability::Int, 13)),
        feat("point_blank_shot", "Point Blank Shot")?,
        feat("precise_shot", "Precise Shot")?
            .with_prerequisite(Prerequisite::has_feat(FeatId::new("point_blank_shot")?))
            .with_prerequisite(Prerequisite::min_bab(1)),
        feat("rapid_shot", "Rapid Shot")?
            .with_prerequisite(Prerequisite::min_ability(Ability::Str, 13))
            .with_prerequisite(Prerequisite::min_bab(1)),
        feat("power_attack", "Power Attack")?.with_prerequisite(Prerequisite::min_ability(Ability::Str, 13)),
        feat("cleave", "Cleave")?.with_prerequisite(Prerequisite::has_feat(FeatId::new("power_attack")?)),
        feat("martial_arts_i", "Martial Arts I")?,
        feat("dual_weapon_mastery_i", "Dual Weapon Mastery I")?
            .with_prerequisite(Prerequisite::min_ability(Ability::Dex, 13))
            .with_prerequisite(Prerequisite::min_bab(1)),
        feat("toughness", "Toughness")?,
        feat("improved_defenses", "Improved Defenses")?,
        feat("quick_draw", "Quick Draw")?.with_prerequisite(Prerequisite::min_bab(1)),
        feat("vehicular_combat", "Vehicular Combat")?
            .with_prerequisite(Prerequisite::trained(SkillId::new("pilot")?)),
        feat("shake_it_off", "Shake It Off")?
            .with_prerequisite(Prerequisite::min_ability(Ability::Con, 13))
            .with_prerequisite(Prerequisite::trained(SkillId::new("endurance")?)),
    ])
}

fn talents() -> Built<Vec<TalentDefinition>> {
    Ok(vec![
        talent("block", "Block", "lightsaber_combat")?,
        talent("deflect", "Deflect", "lightsaber_combat")?,
        talent(
            "weapon_specialization_lightsabers",
            "Weapon Specialization (Lightsabers)",
            "lightsaber_combat",
        )?
        .with_prerequisite(Prerequisite::has_feat(FeatId::new("weapon_focus_lightsabers")?)),
        talent("adept_negotiator", "Adept Negotiator", "jedi_consular")?,
        talent("force_persuasion", "Force Persuasion", "jedi_consular")?
            .with_prerequisite(Prerequisite::has_talent(TalentId::new("adept_negotiator")?)),
        talent("acrobatic_recovery", "Acrobatic Recovery", "jedi_guardian")?,
        talent("battle_meditation", "Battle Meditation", "jedi_guardian")?,
        talent("riposte", "Riposte", "duelist")?
            .with_prerequisite(Prerequisite::has_talent(TalentId::new("block")?)),
        talent("presence", "Presence", "influence")?,
        talent("demand_surrender", "Demand Surrender", "influence")?
            .with_prerequisite(Prerequisite::has_talent(TalentId::new("presence")?)),
        talent("born_leader", "Born Leader", "leadership")?,
        talent("coordinate", "Coordinate", "leadership")?,
        talent("knack", "Knack", "fortune")?,
        talent("dastardly_strike", "Dastardly Strike", "misfortune")?,
        talent("disruptive", "Disruptive", "misfortune")?,
        talent("acute_senses", "Acute Senses", "awareness")?,
        talent("expert_tracker", "Expert Tracker", "awareness")?,
        talent("evasion", "Evasion", "survivor")?,
        talent("extreme_effort", "Extreme Effort", "survivor")?,
        talent("armored_defense", "Armored Defense", "armor_specialist")?,
        talent("improved_armored_defense", "Improved Armored Defense", "armor_specialist")?
            .with_prerequisite(Prerequisite::has_talent(TalentId::new("armored_defense")?)),
        talent("battle_analysis", "Battle Analysis", "commando")?,
        talent("cover_fire", "Cover Fire", "commando")?,
        talent("elusive_dogfighter", "Elusive Dogfighter", "expert_pilot")?,
        talent("keep_it_together", "Keep It Together", "expert_pilot")?,
        talent("controlled_burst", "Controlled Burst", "trooper")?,
        talent("shield_expert", "Shield Expert", "trooper")?,
    ])
}

fn force_powers() -> Built<Vec<ForcePowerDefinition>> {
    Ok(vec![
        power("battle_strike", "Battle Strike")?,
        power("mind_trick", "Mind Trick")?,
        power("move_object", "Move Object")?,
        power("rebuke", "Rebuke")?,
        power("surge", "Surge")?,
        power("vital_transfer", "Vital Transfer")?
            .with_prerequisite(Prerequisite::trained(SkillId::new("treat_injury")?)),
        power("force_slam", "Force Slam")?.with_prerequisite(Prerequisite::min_level(3)),
    ])
}

fn base_class(
    id: &str,
    name: &str,
    hit_die: u32,
    bab_rate: f64,
    defenses: DefenseSet,
    trained_skills: u32,
) -> Built<ClassDefinition> {
    let mut class = ClassDefinition::new(
        ClassId::new(id)?,
        name,
        ClassKind::Base,
        hit_die,
        hit_die * 3,
    )
    .with_standard_table(BASE_CLASS_LEVELS, bab_rate, defenses);
    class.trained_skills = trained_skills;
    Ok(class)
}

fn base_classes() -> Built<Vec<ClassDefinition>> {
    let mut jedi = base_class("jedi", "Jedi", 10, 1.0, DefenseSet::new(1, 1, 1), 2)?;
    jedi.class_skills = skill_ids(JEDI_SKILLS)?.into_iter().collect();
    jedi.talent_trees = tree_ids(&["lightsaber_combat", "jedi_consular", "jedi_guardian"])?
        .into_iter()
        .collect();
    jedi.starting_feats = feat_ids(&[
        "force_sensitivity",
        "weapon_proficiency_lightsabers",
        "weapon_proficiency_simple",
    ])?;
    jedi.force_user = true;

    let mut noble = base_class("noble", "Noble", 6, 0.75, DefenseSet::new(0, 1, 2), 6)?;
    noble.class_skills = skill_ids(&[
        "deception",
        "gather_information",
        "initiative",
        "knowledge_galactic_lore",
        "perception",
        "persuasion",
        "pilot",
        "treat_injury",
        "use_computer",
        "use_the_force",
    ])?
    .into_iter()
    .collect();
    noble.talent_trees = tree_ids(&["influence", "leadership"])?.into_iter().collect();
    noble.starting_feats = feat_ids(&[
        "linguist",
        "weapon_proficiency_pistols",
        "weapon_proficiency_simple",
    ])?;

    let mut scoundrel = base_class("scoundrel", "Scoundrel", 6, 0.75, DefenseSet::new(0, 2, 1), 4)?;
    scoundrel.class_skills = skill_ids(&[
        "acrobatics",
        "deception",
        "gather_information",
        "initiative",
        "mechanics",
        "perception",
        "persuasion",
        "pilot",
        "stealth",
        "use_computer",
        "use_the_force",
    ])?
    .into_iter()
    .collect();
    scoundrel.talent_trees = tree_ids(&["fortune", "misfortune"])?.into_iter().collect();
    scoundrel.starting_feats = feat_ids(&[
        "point_blank_shot",
        "weapon_proficiency_pistols",
        "weapon_proficiency_simple",
    ])?;

    let mut scout = base_class("scout", "Scout", 8, 0.75, DefenseSet::new(1, 2, 0), 5)?;
    scout.class_skills = skill_ids(&[
        "climb",
        "endurance",
        "initiative",
        "jump",
        "mechanics",
        "perception",
        "pilot",
        "stealth",
        "survival",
        "use_the_force",
    ])?
    .into_iter()
    .collect();
    scout.talent_trees = tree_ids(&["awareness", "survivor"])?.into_iter().collect();
    scout.starting_feats = feat_ids(&[
        "shake_it_off",
        "weapon_proficiency_pistols",
        "weapon_proficiency_rifles",
        "weapon_proficiency_simple",
    ])?;

    let mut soldier = base_class("soldier", "Soldier", 10, 1.0, DefenseSet::new(2, 1, 0), 3)?;
    soldier.class_skills = skill_ids(&[
        "climb",
        "endurance",
        "initiative",
        "jump",
        "mechanics",
        "perception",
        "pilot",
        "treat_injury",
        "use_computer",
    ])?
    .into_iter()
    .collect();
    soldier.talent_trees = tree_ids(&["armor_specialist", "commando"])?.into_iter().collect();
    soldier.starting_feats = feat_ids(&[
        "armor_proficiency_light",
        "armor_proficiency_medium",
        "weapon_proficiency_pistols",
        "weapon_proficiency_rifles",
        "weapon_proficiency_simple",
    ])?;

    Ok(vec![jedi, noble, scoundrel, scout, soldier])
}

fn prestige_class(
    id: &str,
    name: &str,
    hit_die: u32,
    bab_rate: f64,
    defenses: DefenseSet,
    requirements: PrestigeRequirements,
) -> Built<ClassDefinition> {
    let mut class = ClassDefinition::new(
        ClassId::new(id)?,
        name,
        ClassKind::Prestige,
        hit_die,
        hit_die * 3,
    )
    .with_standard_table(PRESTIGE_CLASS_LEVELS, bab_rate, defenses);
    class.requirements = Some(requirements);
    Ok(class)
}

fn prestige_classes() -> Built<Vec<ClassDefinition>> {
    let mut jedi_knight = prestige_class(
        "jedi_knight",
        "Jedi Knight",
        10,
        1.0,
        DefenseSet::new(2, 2, 2),
        PrestigeRequirements {
            min_level: 7,
            min_bab: 5,
            required_feats: feat_ids(&["force_sensitivity", "weapon_proficiency_lightsabers"])?,
            required_skills: skill_ids(&["use_the_force"])?,
            special: vec![SpecialRuleId::new("jedi_member")?],
            ..PrestigeRequirements::default()
        },
    )?;
    jedi_knight.class_skills = skill_ids(JEDI_SKILLS)?.into_iter().collect();
    jedi_knight.talent_trees = tree_ids(&[
        "lightsaber_combat",
        "jedi_consular",
        "jedi_guardian",
        "duelist",
    ])?
    .into_iter()
    .collect();
    jedi_knight.starting_feats = feat_ids(&["weapon_focus_lightsabers"])?;
    jedi_knight.force_point_base = 6;
    jedi_knight.force_user = true;

    let mut ace_pilot = prestige_class(
        "ace_pilot",
        "Ace Pilot",
        8,
        0.75,
        DefenseSet::new(2, 4, 0),
        PrestigeRequirements {
            min_level: 7,
            required_feats: feat_ids(&["vehicular_combat"])?,
            required_skills: skill_ids(&["pilot"])?,
            ..PrestigeRequirements::default()
        },
    )?;
    ace_pilot.class_skills = skill_ids(&["initiative", "mechanics", "perception", "pilot", "use_computer"])?
        .into_iter()
        .collect();
    ace_pilot.talent_trees = tree_ids(&["expert_pilot"])?.into_iter().collect();

    let mut elite_trooper = prestige_class(
        "elite_trooper",
        "Elite Trooper",
        12,
        1.0,
        DefenseSet::new(4, 2, 0),
        PrestigeRequirements {
            min_level: 7,
            min_bab: 7,
            required_feats: feat_ids(&[
                "armor_proficiency_medium",
                "martial_arts_i",
                "point_blank_shot",
            ])?,
            required_talent_trees: tree_ids(&["commando"])?,
            ..PrestigeRequirements::default()
        },
    )?
    .with_granted_feat(1, FeatId::new("armor_proficiency_heavy")?);
    elite_trooper.class_skills = skill_ids(&["climb", "endurance", "initiative", "perception", "treat_injury"])?
        .into_iter()
        .collect();
    elite_trooper.talent_trees = tree_ids(&["trooper", "armor_specialist", "commando"])?
        .into_iter()
        .collect();

    Ok(vec![jedi_knight, ace_pilot, elite_trooper])
}

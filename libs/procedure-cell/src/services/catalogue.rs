// libs/procedure-cell/src/services/catalogue.rs
use std::collections::HashSet;
use tracing::{debug, info};

use crate::models::{CatalogueError, Procedure, ProcedureCategory, SizeClass, SizeThresholds};

/// Static reference data for every procedure the clinic offers.
///
/// Loaded once at startup and shared read-only; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct ProcedureCatalogue {
    procedures: Vec<Procedure>,
    thresholds: SizeThresholds,
}

type Entry = (&'static str, &'static str, u32, ProcedureCategory, &'static str);

const CLINIC_PROCEDURES: &[Entry] = &[
    ("lip-augmentation", "Aumento de Labios", 30, ProcedureCategory::Facial, "Aumento y definición de labios"),
    ("bichectomy", "Bichectomía", 40, ProcedureCategory::Facial, "Reducción de mejillas para rostro más definido"),
    ("mentoplasty", "Mentoplastia", 45, ProcedureCategory::Facial, "Aumento o reducción del mentón"),
    ("rhinoplasty", "Rinoplastia", 50, ProcedureCategory::Facial, "Remodelación de nariz para mejorar forma y función"),
    ("gastric-balloon", "Balón Gástrico", 30, ProcedureCategory::Bariatric, "Colocación de balón intragástrico temporal"),
    ("otoplasty", "Otoplastia", 60, ProcedureCategory::Facial, "Corrección de orejas prominentes o deformidades"),
    ("blepharoplasty", "Blefaroplastia", 90, ProcedureCategory::Facial, "Cirugía de párpados para rejuvenecer la mirada"),
    ("breast-augmentation", "Aumento de Busto", 120, ProcedureCategory::Corporal, "Aumento mamario con implantes de silicón"),
    ("arm-lift", "Braquioplastia", 120, ProcedureCategory::Corporal, "Lifting de brazos para eliminar flacidez"),
    ("thigh-lift", "Lifting de Muslos", 150, ProcedureCategory::Corporal, "Remodelación y tonificación de muslos"),
    ("breast-lift", "Mastopexia", 150, ProcedureCategory::Corporal, "Elevación de senos caídos sin implantes"),
    ("liposuction", "Liposucción", 180, ProcedureCategory::Corporal, "Eliminación de grasa localizada en diversas áreas"),
    ("breast-reduction", "Reducción Mamaria", 180, ProcedureCategory::Corporal, "Reducción del tamaño de los senos"),
    ("gastric-band", "Banda Gástrica", 90, ProcedureCategory::Bariatric, "Colocación de banda ajustable en el estómago"),
    ("gastric-sleeve", "Manga Gástrica", 120, ProcedureCategory::Bariatric, "Reducción del estómago para pérdida de peso"),
    ("gastric-bypass", "Bypass Gástrico", 180, ProcedureCategory::Bariatric, "Cirugía de derivación gástrica para obesidad"),
    ("abdominoplasty", "Abdominoplastia", 180, ProcedureCategory::Corporal, "Remodelación del abdomen y eliminación de exceso de piel"),
    ("facelift", "Lifting Facial", 210, ProcedureCategory::Facial, "Rejuvenecimiento facial mediante estiramiento de piel"),
    ("bbl", "BBL (Brazilian Butt Lift)", 240, ProcedureCategory::Corporal, "Aumento y remodelación de glúteos con grasa propia"),
    ("duodenal-switch", "Derivación Biliopancreática", 240, ProcedureCategory::Bariatric, "Cirugía bariátrica compleja para obesidad severa"),
    ("revisional-bariatric", "Cirugía Bariátrica Revisional", 180, ProcedureCategory::Bariatric, "Revisión o corrección de cirugía bariátrica previa"),
];

impl ProcedureCatalogue {
    /// Build a catalogue from already-constructed procedures.
    pub fn new(procedures: Vec<Procedure>, thresholds: SizeThresholds) -> Result<Self, CatalogueError> {
        let mut seen = HashSet::new();
        for procedure in &procedures {
            if procedure.duration_minutes == 0 {
                return Err(CatalogueError::InvalidDuration { id: procedure.id.clone() });
            }
            if !seen.insert(procedure.id.as_str()) {
                return Err(CatalogueError::DuplicateId(procedure.id.clone()));
            }
        }

        Ok(Self { procedures, thresholds })
    }

    /// The clinic's standard offering with the default size thresholds.
    pub fn standard() -> Result<Self, CatalogueError> {
        Self::standard_with_thresholds(SizeThresholds::default())
    }

    pub fn standard_with_thresholds(thresholds: SizeThresholds) -> Result<Self, CatalogueError> {
        let procedures = CLINIC_PROCEDURES
            .iter()
            .map(|(id, name, duration, category, description)| {
                Procedure::new(*id, *name, *duration, *category, &thresholds)
                    .map(|p| p.with_description(*description))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Loaded procedure catalogue with {} procedures", procedures.len());
        Self::new(procedures, thresholds)
    }

    pub fn thresholds(&self) -> &SizeThresholds {
        &self.thresholds
    }

    pub fn size_class_of(&self, duration_minutes: u32) -> SizeClass {
        self.thresholds.classify(duration_minutes)
    }

    pub fn all(&self) -> &[Procedure] {
        &self.procedures
    }

    pub fn get(&self, id: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.id == id)
    }

    /// Resolve a selection of ids, preserving selection order.
    pub fn resolve<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Procedure>, CatalogueError> {
        debug!("Resolving {} procedure ids", ids.len());

        ids.iter()
            .map(|id| {
                self.get(id.as_ref())
                    .cloned()
                    .ok_or_else(|| CatalogueError::UnknownProcedure(id.as_ref().to_string()))
            })
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories_present(&self) -> Vec<ProcedureCategory> {
        let mut categories = Vec::new();
        for procedure in &self.procedures {
            if !categories.contains(&procedure.category) {
                categories.push(procedure.category);
            }
        }
        categories
    }

    pub fn by_category(&self, category: ProcedureCategory) -> Vec<&Procedure> {
        self.procedures.iter().filter(|p| p.category == category).collect()
    }
}

/// Render a duration the way the booking screens show it: `45 min`, `2h`, `3h 30min`.
pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{} min", minutes);
    }

    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}min", hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_standard_catalogue_loads() {
        let catalogue = ProcedureCatalogue::standard().unwrap();
        assert_eq!(catalogue.all().len(), 21);
    }

    #[test]
    fn test_sizes_follow_duration_thresholds() {
        let catalogue = ProcedureCatalogue::standard().unwrap();

        assert_eq!(catalogue.get("otoplasty").unwrap().size, SizeClass::Small);
        assert_eq!(catalogue.get("blepharoplasty").unwrap().size, SizeClass::Medium);
        // 180 minutes sits on the medium boundary regardless of how heavy the surgery is
        assert_eq!(catalogue.get("abdominoplasty").unwrap().size, SizeClass::Medium);
        assert_eq!(catalogue.get("facelift").unwrap().size, SizeClass::Large);
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        let catalogue = ProcedureCatalogue::standard().unwrap();

        assert_eq!(
            catalogue.categories_present(),
            vec![ProcedureCategory::Facial, ProcedureCategory::Bariatric, ProcedureCategory::Corporal]
        );
    }

    #[test]
    fn test_resolve_preserves_order_and_rejects_unknown() {
        let catalogue = ProcedureCatalogue::standard().unwrap();

        let resolved = catalogue.resolve(&["rhinoplasty", "lip-augmentation"]).unwrap();
        assert_eq!(resolved[0].id, "rhinoplasty");
        assert_eq!(resolved[1].id, "lip-augmentation");

        assert_matches!(
            catalogue.resolve(&["rhinoplasty", "teleportation"]),
            Err(CatalogueError::UnknownProcedure(id)) if id == "teleportation"
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let thresholds = SizeThresholds::default();
        let a = Procedure::new("a", "A", 30, ProcedureCategory::Facial, &thresholds).unwrap();
        let result = ProcedureCatalogue::new(vec![a.clone(), a], thresholds);

        assert_matches!(result, Err(CatalogueError::DuplicateId(_)));
    }

    #[test]
    fn test_custom_thresholds_reclassify() {
        let thresholds = SizeThresholds { small_max_minutes: 30, medium_max_minutes: 120 };
        let catalogue = ProcedureCatalogue::standard_with_thresholds(thresholds).unwrap();

        assert_eq!(catalogue.get("bichectomy").unwrap().size, SizeClass::Medium);
        assert_eq!(catalogue.get("liposuction").unwrap().size, SizeClass::Large);
        assert_eq!(catalogue.size_class_of(30), SizeClass::Small);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45 min");
        assert_eq!(format_duration(120), "2h");
        assert_eq!(format_duration(210), "3h 30min");
    }
}

// ============================================================================
// Export CSV
// ============================================================================
// Écrit les tableaux d'une page du dashboard en CSV (UTF-8)
// L'export contient toujours le tableau complet, pas seulement la plage
// d'années affichée
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::app::{App, Page};
use crate::models::sample::{
    climate_indicators, college_employment, green_opportunities, green_risks,
};
use crate::models::IndicatorSeries;

/// Écrit des lignes sérialisables dans `dir/file_name`
pub fn write_csv<R: Serialize>(dir: &Path, file_name: &str, rows: &[R]) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Échec de la création du répertoire {}", dir.display()))?;

    let path = dir.join(file_name);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Impossible de créer {}", path.display()))?;

    for row in rows {
        writer.serialize(row).context("Échec de l'écriture d'une ligne CSV")?;
    }
    writer.flush().context("Échec du flush du fichier CSV")?;

    info!(path = %path.display(), rows = rows.len(), "CSV exported");
    Ok(path)
}

pub fn export_climate(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(vec![write_csv(dir, "climate_indicators.csv", &climate_indicators())?])
}

pub fn export_college(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(vec![write_csv(dir, "college_employment.csv", &college_employment())?])
}

pub fn export_jobs(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(vec![
        write_csv(dir, "green_opportunities.csv", &green_opportunities())?,
        write_csv(dir, "green_risks.csv", &green_risks())?,
    ])
}

/// Un fichier par série, nommé d'après le code (les points deviennent des _)
pub fn export_indicators(dir: &Path, series: &[IndicatorSeries]) -> Result<Vec<PathBuf>> {
    series
        .iter()
        .map(|s| {
            let file_name = format!("worldbank_{}.csv", s.indicator.code().replace('.', "_"));
            write_csv(dir, &file_name, &s.records)
        })
        .collect()
}

/// Exporte les tableaux de la page courante
pub fn export_page(app: &App, dir: &Path) -> Result<Vec<PathBuf>> {
    match app.current_page {
        Page::Climate => export_climate(dir),
        Page::Education => export_college(dir),
        Page::Jobs => export_jobs(dir),
        Page::WorldBank => export_indicators(dir, &app.indicators),
    }
}

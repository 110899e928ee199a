use chrono::Utc;

use crate::config::Config;
use crate::pipeline::Analysis;

/// Rendered report plus how many sections made it in.
#[derive(Debug)]
pub struct Document {
    pub text: String,
    pub section_count: usize,
}

const RULE: &str =
    "================================================================================";

/// Assembles the final report from fixed section templates.
///
/// Pure substitution of computed aggregates; the only branching is which
/// sections the configuration enables.
pub fn render(config: &Config, analysis: &Analysis) -> Document {
    let mut sections: Vec<String> = Vec::new();

    if config.report.resumo_executivo {
        sections.push(resumo_executivo(config, analysis));
    }
    if config.report.metodologia {
        sections.push(metodologia(config));
    }
    if config.report.principais_descobertas {
        sections.push(principais_descobertas(config, analysis));
    }
    if config.report.projecoes_futuras {
        sections.push(projecoes_futuras(config, analysis));
    }
    if config.report.conclusoes {
        sections.push(conclusoes(analysis));
    }

    let header = format!(
        "{rule}\nRELATÓRIO - EXPORTAÇÕES DE VINHO BRASILEIRO ({start}-{end})\nGerado em: {date}\n{rule}\n",
        rule = RULE,
        start = config.analysis.start_year,
        end = config.analysis.end_year,
        date = Utc::now().format("%Y-%m-%d"),
    );

    let section_count = sections.len();
    let mut text = header;
    for section in sections {
        text.push('\n');
        text.push_str(&section);
    }

    Document { text, section_count }
}

fn section_header(title: &str) -> String {
    format!("## {}\n", title)
}

fn resumo_executivo(config: &Config, analysis: &Analysis) -> String {
    let mut s = section_header("Resumo Executivo");
    s.push_str(&format!(
        "Volume total exportado: {} milhões de litros\n",
        fmt_millions(analysis.total.volume_liters)
    ));
    s.push_str(&format!(
        "Valor total das exportações: US$ {} milhões\n",
        fmt_millions(analysis.total.value_usd)
    ));
    s.push_str(&format!(
        "Preço médio por litro: US$ {}\n",
        analysis
            .total
            .avg_unit_price()
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "n/d".to_string())
    ));
    s.push_str(&format!(
        "Taxa de crescimento anual composta (volume): {}\n",
        fmt_rate(analysis.volume_cagr)
    ));
    s.push_str(&format!(
        "Taxa de crescimento anual composta (valor): {}\n",
        fmt_rate(analysis.value_cagr)
    ));

    s.push_str("\nPrincipais mercados por valor:\n");
    let ranked = crate::pipeline::aggregate::rank_countries_by_value(&analysis.countries);
    for (i, (country, agg)) in ranked.iter().take(config.analysis.top_markets).enumerate() {
        s.push_str(&format!(
            "{}. {}: US$ {} milhões\n",
            i + 1,
            country,
            fmt_millions(agg.value_usd)
        ));
    }
    s
}

fn metodologia(config: &Config) -> String {
    let mut s = section_header("Metodologia");
    s.push_str(&format!(
        "Período analisado: {} a {}.\n",
        config.analysis.start_year, config.analysis.end_year
    ));
    s.push_str(
        "Datasets: exportações, clima, demografia, economia e avaliações de vinhos,\n\
         agregados por ano e por país de destino.\n",
    );
    s.push_str(
        "Volumes informados em quilogramas são convertidos para litros na razão 1:1.\n\
         Taxas de crescimento ano a ano são indefinidas quando o ano anterior é zero.\n\
         Correlações de Pearson são calculadas sobre séries alinhadas por ano.\n",
    );
    s
}

fn principais_descobertas(config: &Config, analysis: &Analysis) -> String {
    let mut s = section_header("Principais Descobertas");

    s.push_str("Crescimento ano a ano do valor exportado:\n");
    for (year, rate) in &analysis.value_growth {
        s.push_str(&format!("  {}: {}\n", year, fmt_rate(*rate)));
    }

    if let Some(r) = analysis.climate_quality {
        s.push_str(&format!(
            "\nCorrelação clima-qualidade (temperatura média vs pontuação): {:.3}\n",
            r
        ));
    }

    s.push_str("\nCorrelações entre séries anuais:\n");
    let matrix = &analysis.correlations;
    for (i, a) in matrix.labels.iter().enumerate() {
        for (j, b) in matrix.labels.iter().enumerate() {
            if j <= i {
                continue;
            }
            let cell = match matrix.values[i][j] {
                Some(r) => format!("{:.3}", r),
                None => "n/d".to_string(),
            };
            s.push_str(&format!("  {} vs {}: {}\n", a, b, cell));
        }
    }

    s.push_str("\nRanking de destinos por volume:\n");
    let ranked = crate::pipeline::aggregate::rank_countries_by_volume(&analysis.countries);
    for (i, (country, agg)) in ranked.iter().take(config.analysis.top_markets).enumerate() {
        s.push_str(&format!(
            "{}. {}: {} milhões de litros\n",
            i + 1,
            country,
            fmt_millions(agg.volume_liters)
        ));
    }
    s
}

fn projecoes_futuras(config: &Config, analysis: &Analysis) -> String {
    let mut s = section_header("Projeções Futuras");
    let (Some(volume), Some(value)) = (&analysis.volume_projection, &analysis.value_projection)
    else {
        // Analysis::compute fills both whenever this section is enabled
        s.push_str("Projeções indisponíveis.\n");
        return s;
    };

    s.push_str(&format!(
        "Horizonte de projeção: até {} (ajuste polinomial de grau 2).\n\n",
        config.analysis.projection_until
    ));
    for ((year, vol), val) in volume.years.iter().zip(&volume.values).zip(&value.values) {
        s.push_str(&format!(
            "  {}: {} milhões de litros, US$ {} milhões\n",
            year,
            fmt_millions(*vol),
            fmt_millions(*val)
        ));
    }
    if let (Some(v), Some(w)) = (volume.final_value(), value.final_value()) {
        s.push_str(&format!(
            "\nProjeção {}: {} milhões de litros, US$ {} milhões\n",
            config.analysis.projection_until,
            fmt_millions(v),
            fmt_millions(w)
        ));
    }
    s
}

fn conclusoes(analysis: &Analysis) -> String {
    let mut s = section_header("Conclusões");
    s.push_str(&format!(
        "No período analisado foram exportados {} milhões de litros em {} embarques\n\
         registrados, somando US$ {} milhões para {} países de destino.\n",
        fmt_millions(analysis.total.volume_liters),
        analysis.total.count,
        fmt_millions(analysis.total.value_usd),
        analysis.countries.len()
    ));
    s.push_str(&format!(
        "Crescimento anual composto de {} em volume e {} em valor.\n",
        fmt_rate(analysis.volume_cagr),
        fmt_rate(analysis.value_cagr)
    ));
    s
}

fn fmt_millions(value: f64) -> String {
    format!("{:.1}", value / 1_000_000.0)
}

fn fmt_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:+.1}%", r * 100.0),
        None => "indefinida".to_string(),
    }
}
